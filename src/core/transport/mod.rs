//! HTTP transport layer.
//!
//! The transport owns the listening socket and the endpoint surface;
//! message semantics live in the dispatcher. RPC rides POST requests,
//! events ride a Server-Sent Events stream.

mod config;
mod error;

pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
