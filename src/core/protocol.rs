//! Wire protocol types: the request envelope, the error taxonomy, and
//! the `{result}` / `{error}` response bodies.
//!
//! The envelope is transport-agnostic JSON: requests are
//! `{method, params}`, success responses `{"result": ...}`, and error
//! responses an HTTP-style status plus `{"error": string | {message,
//! details}}`. The two response forms are mutually exclusive.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::domains::tools::ValidationError;

/// A decoded RPC request. Lives for the duration of one dispatch call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    /// Method name, one of the fixed vocabulary routed by the dispatcher.
    pub method: String,

    /// Method-specific payload.
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Errors produced at the dispatch boundary.
///
/// Every failure from validation or handler execution is captured here
/// and converted to a structured response; none of these crash the
/// server.
#[derive(Debug, Error)]
pub enum RpcError {
    /// `tools/call` named a tool that is not registered. A normal,
    /// expected outcome, not a transport failure.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The RPC method is not part of the vocabulary.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Tool arguments failed schema validation.
    #[error("Invalid parameters for tool '{tool}'")]
    InvalidParameters {
        tool: String,
        source: ValidationError,
    },

    /// The request envelope itself was malformed (e.g. missing `name`).
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A tool handler failed; the original description is preserved.
    #[error("{0}")]
    Handler(String),

    /// `executeQuery` was called but no query backend is installed.
    #[error("Direct query execution is not supported")]
    QueryNotSupported,
}

impl RpcError {
    /// HTTP-style status for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::ToolNotFound(_) | Self::UnknownMethod(_) => 404,
            Self::InvalidParameters { .. } | Self::BadRequest(_) => 400,
            Self::Handler(_) => 500,
            Self::QueryNotSupported => 501,
        }
    }

    /// The `{"error": ...}` response body.
    ///
    /// Validation failures carry the full violation list under
    /// `details`; every other error is a plain message string.
    pub fn to_body(&self) -> Value {
        match self {
            Self::InvalidParameters { source, .. } => json!({
                "error": {
                    "message": self.to_string(),
                    "details": source.violations,
                }
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// Serialize a successful dispatch outcome as `{"result": ...}`.
pub fn result_body(result: Value) -> Value {
    json!({ "result": result })
}
