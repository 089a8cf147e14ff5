//! HTTP transport implementation.
//!
//! Two endpoints carry the protocol: POST on the RPC path takes a
//! `{method, params}` envelope and answers `{"result": ...}` or an
//! HTTP error status with `{"error": ...}`, and GET on the events path
//! opens a Server-Sent Events stream fed by the connection manager.
//! A `/health` endpoint and a root info page round out the surface.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::McpServer;
use crate::core::protocol::{RpcRequest, result_body};
use crate::domains::events::{ConnectionId, ConnectionManager};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the router serving the RPC, events, and health endpoints.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState { server };

        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route(&self.config.events_path, get(handle_events))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state);

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport until the shutdown future resolves.
    ///
    /// Shutdown closes every open event stream so in-flight SSE
    /// responses end and the server can drain.
    pub async fn run<F>(self, server: McpServer, shutdown: F) -> TransportResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.address();
        let connections = Arc::clone(server.connections());
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → RPC:    POST {}", self.config.rpc_path);
        info!("  → Events: GET  {}", self.config.events_path);
        info!("  → Health: GET  /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received, closing event streams");
                connections.close_all();
            })
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "endpoints": {
            "rpc": "/rpc",
            "events": "/events",
            "health": "/health"
        }
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle one RPC envelope.
///
/// The outcome of dispatch decides the response shape: a success
/// becomes `200 {"result": ...}`, an error becomes its mapped status
/// with `{"error": ...}`. The two never mix.
async fn handle_rpc(State(state): State<AppState>, Json(request): Json<RpcRequest>) -> Response {
    match state.server.dispatch(request).await {
        Ok(result) => (StatusCode::OK, Json(result_body(result))).into_response(),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(err.to_body())).into_response()
        }
    }
}

/// Removes the connection from the manager when the SSE stream is
/// dropped, whether the client disconnected or the stream ended.
struct DisconnectGuard {
    manager: Arc<ConnectionManager>,
    id: ConnectionId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.manager.disconnect(self.id);
    }
}

/// Server-Sent Events endpoint.
///
/// Registers the client with the connection manager (which queues the
/// `connected` handshake frame) and drains its sink into the response.
async fn handle_events(State(state): State<AppState>) -> impl IntoResponse {
    let manager = Arc::clone(state.server.connections());
    let (id, mut rx) = manager.connect();
    let guard = DisconnectGuard { manager, id };

    let stream = async_stream::stream! {
        let _guard = guard;
        while let Some(frame) = rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => yield Ok::<_, Infallible>(Event::default().data(json)),
                Err(err) => warn!("Dropping unserializable event frame: {err}"),
            }
        }
    };

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::tools::schema::{FieldSpec, ParamSchema};
    use crate::domains::tools::{ToolDefinition, ToolRegistry};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "echo",
                "Echo the message back",
                ParamSchema::new().field(FieldSpec::string("msg").required()),
                |params| async move { Ok(Value::Object(params)) },
            ))
            .unwrap();
        let server = McpServer::with_registry(Config::default(), registry);
        HttpTransport::new(HttpConfig::default()).router(server)
    }

    async fn post_rpc(app: Router, method: &str, params: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "method": method, "params": params }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_rpc_tools_list() {
        let (status, body) = post_rpc(test_app(), "tools/list", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["tools"][0]["name"], "echo");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_rpc_call_success() {
        let (status, body) = post_rpc(
            test_app(),
            "tools/call",
            json!({ "name": "echo", "arguments": { "msg": "hi" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["msg"], "hi");
    }

    #[tokio::test]
    async fn test_unknown_method_maps_to_404() {
        let (status, body) = post_rpc(test_app(), "bogus/method", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("bogus/method"));
    }

    #[tokio::test]
    async fn test_validation_failure_maps_to_400_with_details() {
        let (status, body) = post_rpc(
            test_app(),
            "tools/call",
            json!({ "name": "echo", "arguments": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "msg");
    }

    #[tokio::test]
    async fn test_events_stream_starts_with_connected_frame() {
        let response = test_app()
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-cache"
        );

        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.starts_with("data:"));
        assert!(text.contains("\"event\":\"connected\""));
        assert!(text.contains("connectionId"));
    }
}
