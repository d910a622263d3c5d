//! Identity → connection handle registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::connection::ConnectionHandle;

/// Who is online, and through which connection.
///
/// At most one handle is kept per identity; registering again overwrites the
/// previous handle. Identities are taken as given.
#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// Record `handle` as the live connection for `identity`.
    /// Returns the handle it replaced, if any.
    async fn register(
        &self,
        identity: &str,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle>;

    /// Live connection for `identity`, if online.
    async fn resolve(&self, identity: &str) -> Option<ConnectionHandle>;

    /// Drop the entry whose handle is `handle` and return its identity.
    ///
    /// A handle that has since been replaced for its identity removes nothing.
    async fn remove(&self, handle: &ConnectionHandle) -> Option<String>;

    /// Every identity currently online, sorted.
    async fn online_identities(&self) -> Vec<String>;
}

/// Single-process registry.
#[derive(Clone, Default)]
pub struct InMemoryPresenceRegistry {
    entries: Arc<RwLock<HashMap<String, ConnectionHandle>>>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn register(
        &self,
        identity: &str,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let previous = self
            .entries
            .write()
            .await
            .insert(identity.to_string(), handle.clone());
        match &previous {
            Some(old) => info!(
                identity = %identity,
                handle = %handle,
                replaced = %old,
                "Presence re-registered"
            ),
            None => info!(identity = %identity, handle = %handle, "Presence registered"),
        }
        previous
    }

    async fn resolve(&self, identity: &str) -> Option<ConnectionHandle> {
        self.entries.read().await.get(identity).cloned()
    }

    async fn remove(&self, handle: &ConnectionHandle) -> Option<String> {
        let mut entries = self.entries.write().await;
        let identity = entries
            .iter()
            .find(|(_, h)| *h == handle)
            .map(|(id, _)| id.clone());
        match identity {
            Some(id) => {
                entries.remove(&id);
                info!(identity = %id, handle = %handle, "Presence removed");
                Some(id)
            }
            None => {
                debug!(handle = %handle, "No presence entry for handle");
                None
            }
        }
    }

    async fn online_identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
