//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the
//! server, including error handling, configuration, the protocol
//! dispatcher, and the HTTP transport.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{RpcError, RpcRequest};
pub use server::{McpServer, QueryBackend};
pub use transport::{HttpConfig, HttpTransport};
