//! Authentication module for `SoulAce` server.
//!
//! Tokens are issued by the account service; this server validates them to
//! learn who is calling.

pub mod claims;
pub mod jwt;

pub use claims::{Claims, Role};
pub use jwt::JwtManager;
