//! HTTP transport configuration.

use serde::{Deserialize, Serialize};

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path for the RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Path for the SSE event stream.
    #[serde(default = "default_events_path")]
    pub events_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rpc_path() -> String {
    "/rpc".to_string()
}

fn default_events_path() -> String {
    "/events".to_string()
}

fn default_cors() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rpc_path: default_rpc_path(),
            events_path: default_events_path(),
            enable_cors: default_cors(),
        }
    }
}

impl HttpConfig {
    /// Load transport config from `MCP_HTTP_*` environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("MCP_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());
        let rpc_path = std::env::var("MCP_HTTP_RPC_PATH").unwrap_or_else(|_| default_rpc_path());
        let events_path =
            std::env::var("MCP_HTTP_EVENTS_PATH").unwrap_or_else(|_| default_events_path());
        let enable_cors = std::env::var("MCP_HTTP_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host,
            port,
            rpc_path,
            events_path,
            enable_cors,
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
