//! Process-local hub of open relay connections.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use soulace_core::ServerEvent;

/// Opaque id of one socket connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(String);

impl ConnectionHandle {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<&str> for ConnectionHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open socket: who opened it and where its outbound events go.
pub struct Connection {
    pub handle: ConnectionHandle,
    pub identity: String,
    event_tx: mpsc::Sender<ServerEvent>,
}

impl Connection {
    /// Queue an event for the socket writer without waiting.
    pub fn send_event(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::TrySendError<ServerEvent>> {
        self.event_tx.try_send(event)
    }
}

/// Thread-safe map of the connections this process is serving.
#[derive(Clone, Default)]
pub struct ConnectionHub {
    connections: Arc<RwLock<HashMap<ConnectionHandle, Arc<Connection>>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new connection for `identity` with a bounded outbound queue.
    pub async fn attach(
        &self,
        identity: &str,
        buffer: usize,
    ) -> (Arc<Connection>, mpsc::Receiver<ServerEvent>) {
        let (event_tx, event_rx) = mpsc::channel(buffer.max(1));
        let conn = Arc::new(Connection {
            handle: ConnectionHandle::generate(),
            identity: identity.to_string(),
            event_tx,
        });
        self.connections
            .write()
            .await
            .insert(conn.handle.clone(), Arc::clone(&conn));
        info!(identity = %identity, handle = %conn.handle, "Connection attached");
        (conn, event_rx)
    }

    /// Forget a connection. Its writer ends once the last sender is dropped.
    pub async fn detach(&self, handle: &ConnectionHandle) -> Option<Arc<Connection>> {
        let conn = self.connections.write().await.remove(handle);
        if conn.is_some() {
            info!(handle = %handle, "Connection detached");
        } else {
            warn!(handle = %handle, "Tried to detach unknown connection");
        }
        conn
    }

    pub async fn get(&self, handle: &ConnectionHandle) -> Option<Arc<Connection>> {
        self.connections.read().await.get(handle).cloned()
    }

    /// Queue `event` on every open connection. Returns how many accepted it.
    pub async fn broadcast(&self, event: &ServerEvent) -> usize {
        let connections = self.connections.read().await;
        let mut delivered = 0;
        for conn in connections.values() {
            match conn.send_event(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    handle = %conn.handle,
                    identity = %conn.identity,
                    error = %e,
                    "Dropped broadcast event"
                ),
            }
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
