//! Event routing over the presence channel.

pub mod relay;

pub use relay::{RelayError, RelayRouter};
