//! Protocol dispatcher and server state.
//!
//! [`McpServer`] routes each decoded request to the correct behavior:
//! capability negotiation (`initialize`), discovery (`tools/list`),
//! invocation (`tools/call`), the `executeQuery` extension point, and
//! the unknown-method fallback. It owns the tool registry and the
//! connection manager, and nothing else: dispatch holds no mutable
//! per-call state, so any number of calls may be in flight at once.
//!
//! Tools are registered by composition at construction time; there is
//! no subclassing chain to extend. The parameter validator runs in
//! front of every handler with no bypass path.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::domains::events::ConnectionManager;
use crate::domains::tools::{ToolError, ToolRegistry, definitions, validate};

use super::config::Config;
use super::error::Result;
use super::protocol::{RpcError, RpcRequest};

/// Version of the tool invocation protocol spoken on the RPC endpoint.
const PROTOCOL_VERSION: u32 = 1;

/// Extension point for free-form query execution (`executeQuery`).
///
/// No backend is installed by default; the method then answers
/// "not supported".
#[async_trait::async_trait]
pub trait QueryBackend: Send + Sync {
    /// Execute a free-form query and return its result payload.
    async fn execute(&self, query: &str) -> std::result::Result<Value, String>;
}

/// The protocol server: tool registry, connection manager, dispatcher.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools; populated at construction, read-only afterwards.
    registry: Arc<ToolRegistry>,

    /// Open event-stream listeners.
    connections: Arc<ConnectionManager>,

    /// Optional `executeQuery` backend.
    query_backend: Option<Arc<dyn QueryBackend>>,
}

impl McpServer {
    /// Create a server with the full Auth0 tool set registered.
    pub fn new(config: Config) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        definitions::register_all(&mut registry, &config.credentials)?;
        info!("Registered {} tools", registry.len());
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an externally populated registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            connections: Arc::new(ConnectionManager::new()),
            query_backend: None,
        }
    }

    /// Install an `executeQuery` backend.
    pub fn with_query_backend(mut self, backend: Arc<dyn QueryBackend>) -> Self {
        self.query_backend = Some(backend);
        self
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// The connection manager for the event-stream transport.
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Push an event to every connected listener.
    pub fn broadcast(&self, event: &str, data: Value) -> usize {
        self.connections.broadcast(event, data)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Route one request to its behavior and produce the outcome.
    ///
    /// Every error is returned as a structured [`RpcError`]; nothing
    /// escapes as a panic or an unhandled failure.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn dispatch(&self, request: RpcRequest) -> std::result::Result<Value, RpcError> {
        info!("Handling RPC method: {}", request.method);

        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "executeQuery" => self.handle_execute_query(&request.params).await,
            other => {
                warn!("Unknown method: {other}");
                Err(RpcError::UnknownMethod(other.to_string()))
            }
        }
    }

    /// Static capability and version metadata. Idempotent.
    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "discovery": true,
                    "execution": true,
                },
                "streaming": true,
            },
            "serverInfo": {
                "name": self.name(),
                "version": self.version(),
            },
        })
    }

    /// Discovery metadata for all registered tools, registration order.
    fn handle_tools_list(&self) -> Value {
        json!({ "tools": self.registry.list() })
    }

    /// Look up, validate, invoke.
    async fn handle_tools_call(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::BadRequest("missing tool name".to_string()))?;

        let tool = self
            .registry
            .lookup(name)
            .ok_or_else(|| RpcError::ToolNotFound(name.to_string()))?;

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let validated = validate(tool.schema(), &arguments).map_err(|source| {
            warn!("Validation failed for '{name}': {source}");
            RpcError::InvalidParameters {
                tool: name.to_string(),
                source,
            }
        })?;

        match tool.invoke(validated).await {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!("Tool '{name}' failed: {err}");
                Err(RpcError::Handler(err.to_string()))
            }
        }
    }

    /// `executeQuery` extension point.
    async fn handle_execute_query(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let backend = self
            .query_backend
            .as_ref()
            .ok_or(RpcError::QueryNotSupported)?;

        let query = params
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::BadRequest("missing query".to_string()))?;

        backend.execute(query).await.map_err(RpcError::Handler)
    }
}

// Keep ToolError convertible for callers composing their own registries.
impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => Self::ToolNotFound(name),
            ToolError::InvalidArguments(source) => Self::InvalidParameters {
                tool: String::new(),
                source,
            },
            other => Self::Handler(other.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolDefinition;
    use crate::domains::tools::schema::{FieldSpec, ParamSchema};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn echo_tool() -> ToolDefinition {
        ToolDefinition::new(
            "echo",
            "Echo the message back",
            ParamSchema::new().field(FieldSpec::string("msg").required()),
            |params| async move { Ok(Value::Object(params)) },
        )
    }

    fn test_server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();
        McpServer::with_registry(Config::default(), registry)
    }

    fn call(name: &str, arguments: Value) -> RpcRequest {
        RpcRequest::new("tools/call", json!({ "name": name, "arguments": arguments }))
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let server = test_server();
        let first = server
            .dispatch(RpcRequest::new("initialize", Value::Null))
            .await
            .unwrap();
        let second = server
            .dispatch(RpcRequest::new("initialize", Value::Null))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first["protocolVersion"], 1);
        assert_eq!(first["capabilities"]["tools"]["discovery"], true);
        assert_eq!(first["serverInfo"]["name"], "auth0-mcp");
    }

    #[tokio::test]
    async fn test_tools_list_exposes_registered_tools() {
        let server = test_server();
        let result = server
            .dispatch(RpcRequest::new("tools/list", Value::Null))
            .await
            .unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0].get("handler").is_none());
    }

    #[tokio::test]
    async fn test_echo_call_returns_result_unmodified() {
        let server = test_server();
        let result = server
            .dispatch(call("echo", json!({ "msg": "hi" })))
            .await
            .unwrap();
        assert_eq!(result, json!({ "msg": "hi" }));
    }

    #[tokio::test]
    async fn test_missing_required_field_lists_violation() {
        let server = test_server();
        let err = server.dispatch(call("echo", json!({}))).await.unwrap_err();
        match err {
            RpcError::InvalidParameters { tool, source } => {
                assert_eq!(tool, "echo");
                assert_eq!(source.violations[0].field, "msg");
            }
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_invoke_any_handler() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "counted",
                "Counts invocations",
                ParamSchema::new(),
                |_| async {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Null)
                },
            ))
            .unwrap();
        let server = McpServer::with_registry(Config::default(), registry);

        let err = server
            .dispatch(call("nonexistent", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::ToolNotFound(name) if name == "nonexistent"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_preserves_message() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "broken",
                "Always fails",
                ParamSchema::new(),
                |_| async { Err(ToolError::execution_failed("backend exploded")) },
            ))
            .unwrap();
        let server = McpServer::with_registry(Config::default(), registry);

        let err = server.dispatch(call("broken", json!({}))).await.unwrap_err();
        match &err {
            RpcError::Handler(msg) => assert!(msg.contains("backend exploded")),
            other => panic!("expected Handler, got {other:?}"),
        }
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let err = server
            .dispatch(RpcRequest::new("tools/destroy", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::UnknownMethod(_)));
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_execute_query_unsupported_by_default() {
        let server = test_server();
        let err = server
            .dispatch(RpcRequest::new("executeQuery", json!({ "query": "x" })))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::QueryNotSupported));
        assert_eq!(err.status(), 501);
    }

    #[tokio::test]
    async fn test_execute_query_with_backend() {
        struct Upper;

        #[async_trait::async_trait]
        impl QueryBackend for Upper {
            async fn execute(&self, query: &str) -> std::result::Result<Value, String> {
                Ok(json!(query.to_uppercase()))
            }
        }

        let server = test_server().with_query_backend(Arc::new(Upper));
        let result = server
            .dispatch(RpcRequest::new("executeQuery", json!({ "query": "abc" })))
            .await
            .unwrap();
        assert_eq!(result, json!("ABC"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_complete_independently() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "slow_fail",
                "Sleeps then fails",
                ParamSchema::new(),
                |_| async {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Err(ToolError::execution_failed("slow failure"))
                },
            ))
            .unwrap();
        registry
            .register(ToolDefinition::new(
                "fast_ok",
                "Returns immediately",
                ParamSchema::new(),
                |_| async { Ok(json!("done")) },
            ))
            .unwrap();
        let server = McpServer::with_registry(Config::default(), registry);

        let slow = server.dispatch(call("slow_fail", json!({})));
        let fast = server.dispatch(call("fast_ok", json!({})));
        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert!(matches!(slow_outcome, Err(RpcError::Handler(_))));
        assert_eq!(fast_outcome.unwrap(), json!("done"));
    }

    #[tokio::test]
    async fn test_full_auth0_server_construction() {
        let server = McpServer::new(Config::default()).unwrap();
        let result = server
            .dispatch(RpcRequest::new("tools/list", Value::Null))
            .await
            .unwrap();
        assert_eq!(result["tools"].as_array().unwrap().len(), 9);
        assert_eq!(result["tools"][0]["name"], "auth0_list_users");
    }
}
