//! Error types for `SoulAce` core library.

use thiserror::Error;

/// Result type alias using `SoulAce` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `SoulAce` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
