//! Tool definition: discovery metadata plus an attached async handler.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ToolError;
use super::schema::ParamSchema;

/// Boxed async handler invoked with validated parameters.
pub type ToolHandler =
    Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A named, schema-described remote operation.
///
/// The schema gates every invocation: the dispatcher validates raw
/// arguments against it before the handler ever runs.
#[derive(Clone)]
pub struct ToolDefinition {
    name: String,
    description: String,
    schema: ParamSchema,
    handler: ToolHandler,
}

/// Discovery metadata exposed by `tools/list`. Never carries the handler.
#[derive(Debug, Clone, Serialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition from an async closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParamSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(move |params| handler(params).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    /// Invoke the handler with already-validated parameters.
    pub async fn invoke(&self, params: Map<String, Value>) -> Result<Value, ToolError> {
        (self.handler)(params).await
    }

    /// Project the definition into its discovery metadata.
    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.schema.to_wire(),
        }
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
