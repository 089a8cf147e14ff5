//! Configuration management for the server.
//!
//! A centralized configuration structure populated from environment
//! variables (with `.env` support via dotenvy). Required values are
//! checked once by [`Config::validate`] before the server starts; a
//! failure there is fatal by design.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::Error;
use super::transport::HttpConfig;

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// HTTP transport configuration.
    pub http: HttpConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Fallback Auth0 management credentials.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Fallback Auth0 management credentials.
///
/// When both values are configured they become schema defaults for the
/// `domain`/`token` tool parameters; callers may still override them per
/// invocation. When absent, every call must supply its own credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Auth0 tenant domain (e.g. "tenant.eu.auth0.com").
    pub domain: Option<String>,

    /// Auth0 Management API token.
    pub token: Option<String>,
}

/// Custom Debug implementation to redact the token from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("domain", &self.domain)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "auth0-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            http: HttpConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server variables are prefixed with `MCP_` (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_HTTP_HOST`, `MCP_HTTP_PORT`); the Auth0
    /// fallback credentials use the conventional `AUTH0_DOMAIN` and
    /// `AUTH0_MGMT_TOKEN` names.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.http = HttpConfig::from_env();

        if let Ok(domain) = std::env::var("AUTH0_DOMAIN") {
            config.credentials.domain = Some(domain);
        }
        if let Ok(token) = std::env::var("AUTH0_MGMT_TOKEN") {
            config.credentials.token = Some(token);
        }

        config
    }

    /// Check that required configuration is present and coherent.
    ///
    /// Called once before the first request is served; a failure here
    /// aborts start-up.
    pub fn validate(&self) -> Result<(), Error> {
        if self.server.name.is_empty() {
            return Err(Error::config("server name must not be empty"));
        }
        if self.http.port == 0 {
            return Err(Error::config("MCP_HTTP_PORT must not be 0"));
        }
        if !self.http.rpc_path.starts_with('/') || !self.http.events_path.starts_with('/') {
            return Err(Error::config("endpoint paths must start with '/'"));
        }

        match (&self.credentials.domain, &self.credentials.token) {
            (Some(domain), Some(_)) => {
                if domain.is_empty() || domain.contains("://") || domain.contains('/') {
                    return Err(Error::config(format!(
                        "AUTH0_DOMAIN must be a bare hostname, got '{domain}'"
                    )));
                }
                info!("Fallback Auth0 credentials configured for {domain}");
            }
            (None, None) => {
                info!("No fallback Auth0 credentials; callers must supply domain/token per call");
            }
            _ => {
                return Err(Error::config(
                    "AUTH0_DOMAIN and AUTH0_MGMT_TOKEN must be set together",
                ));
            }
        }

        Ok(())
    }
}
