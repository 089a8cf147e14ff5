//! Tool-specific error types.

use thiserror::Error;

use super::validator::ValidationError;

/// Errors that can occur during tool registration and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    Duplicate(String),

    /// The arguments failed schema validation.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationError),

    /// The tool's backend call failed.
    #[error("{0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}

impl From<crate::backend::BackendError> for ToolError {
    fn from(err: crate::backend::BackendError) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}
