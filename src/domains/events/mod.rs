//! Events domain module.
//!
//! Server-push side of the protocol: the connection manager that owns
//! open event-stream listeners and the broadcast channel that fans
//! frames out to them.

mod manager;

pub use manager::{ConnectionId, ConnectionManager, EventFrame};
