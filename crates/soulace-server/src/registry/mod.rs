//! Presence tracking for the relay channel.
//!
//! [`PresenceRegistry`] maps identities to opaque connection handles and can
//! be backed by any store. [`ConnectionHub`] is always process-local: it owns
//! the outbound channel of every socket this process is serving.

mod connection;
mod presence;

pub use connection::{Connection, ConnectionHandle, ConnectionHub};
pub use presence::{InMemoryPresenceRegistry, PresenceRegistry};
