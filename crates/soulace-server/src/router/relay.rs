//! Chat handshake relay between connected parties.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use soulace_core::{ClientEvent, ServerEvent};

use crate::registry::{Connection, ConnectionHandle, ConnectionHub, PresenceRegistry};

/// Resolves receivers through the presence registry and forwards events to
/// their connection. Nothing is persisted, retried or acknowledged.
#[derive(Clone)]
pub struct RelayRouter {
    presence: Arc<dyn PresenceRegistry>,
    hub: ConnectionHub,
    outbound_buffer: usize,
}

impl RelayRouter {
    pub fn new(
        presence: Arc<dyn PresenceRegistry>,
        hub: ConnectionHub,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            presence,
            hub,
            outbound_buffer,
        }
    }

    /// Open a connection for `identity`, register its presence and tell
    /// everyone who is online now.
    pub async fn connect(&self, identity: &str) -> (Arc<Connection>, mpsc::Receiver<ServerEvent>) {
        let (conn, rx) = self.hub.attach(identity, self.outbound_buffer).await;
        self.presence.register(identity, conn.handle.clone()).await;
        self.broadcast_online().await;
        (conn, rx)
    }

    /// Close a connection. Returns the identity that went offline, which is
    /// `None` when a newer connection for the same identity is still live.
    pub async fn disconnect(&self, handle: &ConnectionHandle) -> Option<String> {
        self.hub.detach(handle).await;
        let removed = self.presence.remove(handle).await;
        self.broadcast_online().await;
        removed
    }

    /// Forward one inbound event from `from` to its receiver.
    pub async fn dispatch(&self, from: &str, event: ClientEvent) -> Result<(), RelayError> {
        let name = event.name();
        let (to, outbound) = event.into_delivery(from);

        let handle = self
            .presence
            .resolve(&to)
            .await
            .ok_or_else(|| RelayError::ReceiverOffline(to.clone()))?;
        let conn = self
            .hub
            .get(&handle)
            .await
            .ok_or_else(|| RelayError::ReceiverOffline(to.clone()))?;

        conn.send_event(outbound)
            .map_err(|_| RelayError::SendFailed(to.clone()))?;

        debug!(event = name, from = %from, to = %to, "Relayed event");
        Ok(())
    }

    /// Push the current online list to every connection.
    pub async fn broadcast_online(&self) {
        let online = self.presence.online_identities().await;
        let count = online.len();
        let delivered = self.hub.broadcast(&ServerEvent::OnlineUsers(online)).await;
        info!(online = count, delivered, "Broadcast online users");
    }

    /// Open sockets, including superseded ones that have not closed yet.
    pub async fn connection_count(&self) -> usize {
        self.hub.connection_count().await
    }

    pub async fn online_identities(&self) -> Vec<String> {
        self.presence.online_identities().await
    }

    pub async fn is_online(&self, identity: &str) -> bool {
        self.presence.resolve(identity).await.is_some()
    }
}

/// Why an event was not delivered. Callers log and drop.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Receiver offline: {0}")]
    ReceiverOffline(String),

    #[error("Receiver queue full or closed: {0}")]
    SendFailed(String),
}

impl RelayError {
    pub fn log(&self, from: &str) {
        match self {
            Self::ReceiverOffline(_) => debug!(from = %from, error = %self, "Event dropped"),
            Self::SendFailed(_) => warn!(from = %from, error = %self, "Event dropped"),
        }
    }
}
