use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use parley_types::events::GatewayEvent;

/// Manages all connected clients and their room subscriptions.
///
/// join, publish and disconnect are the registry's only mutators; the lock
/// serializes them so handlers may run on any worker thread.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<RwLock<Registry>>,
}

#[derive(Default)]
struct Registry {
    /// conn_id -> outbound event channel
    connections: HashMap<Uuid, mpsc::UnboundedSender<GatewayEvent>>,

    /// room name -> subscribed conn_ids
    rooms: HashMap<String, HashSet<Uuid>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Register a new connection. Returns (conn_id, receiver); events
    /// published to rooms the connection joins arrive on the receiver.
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.write().await.connections.insert(conn_id, tx);
        (conn_id, rx)
    }

    /// Subscribe a connection to a room. Idempotent.
    pub async fn join(&self, conn_id: Uuid, room: &str) {
        let mut registry = self.inner.write().await;
        if !registry.connections.contains_key(&conn_id) {
            return;
        }
        registry
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
    }

    /// Deliver an event to every connection currently subscribed to `room`.
    /// Fire-and-forget: the event itself is never persisted, and closed
    /// receivers are skipped.
    pub async fn publish(&self, room: &str, event: GatewayEvent) {
        let registry = self.inner.read().await;
        let Some(subscribers) = registry.rooms.get(room) else {
            return;
        };
        for conn_id in subscribers {
            if let Some(tx) = registry.connections.get(conn_id) {
                let _ = tx.send(event.clone());
            }
        }
    }

    /// Remove a connection from the registry and from every room it joined.
    /// No further events are delivered to it.
    pub async fn disconnect(&self, conn_id: Uuid) {
        let mut registry = self.inner.write().await;
        registry.connections.remove(&conn_id);
        for subscribers in registry.rooms.values_mut() {
            subscribers.remove(&conn_id);
        }
        registry.rooms.retain(|_, subscribers| !subscribers.is_empty());
    }
}
