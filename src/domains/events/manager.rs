//! Connection Manager and broadcast channel for the event stream.
//!
//! Tracks open SSE listeners keyed by connection id. Each connection owns
//! an unbounded sink; the SSE transport task drains the matching receiver
//! and writes frames to the socket, so per-sink writes never interleave.
//! Broadcast delivers to the set of connections registered at the moment
//! of the call; a dead sink is removed without aborting delivery to the
//! others.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque identifier for one active event-stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One `{event, data}` frame pushed to listeners.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventFrame {
    pub event: String,
    pub data: Value,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Tracks open event-stream listeners and fans out broadcast frames.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    sinks: Mutex<HashMap<ConnectionId, UnboundedSender<EventFrame>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    ///
    /// Allocates a fresh id, registers the sink, and queues the
    /// `connected` handshake frame for that sink only.
    pub fn connect(&self) -> (ConnectionId, UnboundedReceiver<EventFrame>) {
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();

        // The receiver cannot be gone yet, but a send error here is
        // harmless either way: the drop guard will clean up.
        let _ = tx.send(EventFrame::new(
            "connected",
            serde_json::json!({ "connectionId": id.to_string() }),
        ));

        self.sinks
            .lock()
            .expect("connection registry poisoned")
            .insert(id, tx);
        info!("Event stream connected: {id}");
        (id, rx)
    }

    /// Remove a listener. Idempotent: removing an unknown id is a no-op.
    pub fn disconnect(&self, id: ConnectionId) {
        let removed = self
            .sinks
            .lock()
            .expect("connection registry poisoned")
            .remove(&id)
            .is_some();
        if removed {
            info!("Event stream disconnected: {id}");
        }
    }

    /// Push an event to every currently registered listener.
    ///
    /// Returns the number of sinks the frame was delivered to. Sinks whose
    /// receiving side is gone are dropped from the registry.
    pub fn broadcast(&self, event: &str, data: Value) -> usize {
        let frame = EventFrame::new(event, data);
        let mut sinks = self.sinks.lock().expect("connection registry poisoned");

        let mut dead = Vec::new();
        let mut delivered = 0;
        for (id, tx) in sinks.iter() {
            if tx.send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            sinks.remove(&id);
            debug!("Dropped dead event sink: {id}");
        }

        debug!("Broadcast '{event}' delivered to {delivered} connection(s)");
        delivered
    }

    /// Number of currently open connections.
    pub fn connection_count(&self) -> usize {
        self.sinks
            .lock()
            .expect("connection registry poisoned")
            .len()
    }

    /// Drop every sink, ending all listener streams. Used on shutdown.
    pub fn close_all(&self) {
        let mut sinks = self.sinks.lock().expect("connection registry poisoned");
        let count = sinks.len();
        sinks.clear();
        if count > 0 {
            info!("Closed {count} event stream connection(s)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_connect_sends_handshake_frame() {
        let manager = ConnectionManager::new();
        let (id, mut rx) = manager.connect();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.event, "connected");
        assert_eq!(frame.data["connectionId"], id.to_string());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connections() {
        let manager = ConnectionManager::new();
        let (_a, mut rx_a) = manager.connect();
        let (_b, mut rx_b) = manager.connect();
        rx_a.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        let delivered = manager.broadcast("user_created", json!({ "email": "a@b.co" }));
        assert_eq!(delivered, 2);

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = rx.recv().await.unwrap();
            assert_eq!(frame.event, "user_created");
            assert_eq!(frame.data["email"], "a@b.co");
        }
    }

    #[tokio::test]
    async fn test_dead_sink_removed_without_aborting_delivery() {
        let manager = ConnectionManager::new();
        let (_a, rx_a) = manager.connect();
        let (_b, mut rx_b) = manager.connect();
        rx_b.recv().await.unwrap();

        // Simulate a client that went away without a clean disconnect.
        drop(rx_a);

        let delivered = manager.broadcast("ping", json!(null));
        assert_eq!(delivered, 1);
        assert_eq!(manager.connection_count(), 1);
        assert_eq!(rx_b.recv().await.unwrap().event, "ping");
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let manager = ConnectionManager::new();
        let (id, _rx) = manager.connect();
        manager.disconnect(id);
        manager.disconnect(id);
        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_close_all_ends_streams() {
        let manager = ConnectionManager::new();
        let (_id, mut rx) = manager.connect();
        rx.recv().await.unwrap();

        manager.close_all();
        assert_eq!(manager.connection_count(), 0);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_frame_serializes_to_wire_shape() {
        let frame = EventFrame::new("x", json!({ "n": 1 }));
        let wire = serde_json::to_string(&frame).unwrap();
        assert_eq!(wire, r#"{"event":"x","data":{"n":1}}"#);
    }
}
