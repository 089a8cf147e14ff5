//! Auth0 Tool Invocation Server Library
//!
//! This crate provides a tool invocation protocol server exposing the
//! Auth0 Management API as schema-described tools, with a modular
//! architecture organized by domains.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling,
//!   the protocol dispatcher, and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: schema-described tools, parameter validation, the registry
//!   - **events**: connection tracking and broadcast for the event stream
//! - **backend**: the Auth0 Management API client
//!
//! # Example
//!
//! ```rust,no_run
//! use auth0_mcp_server::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let server = McpServer::new(config)?;
//!     // Start the transport...
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
