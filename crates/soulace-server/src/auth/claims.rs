//! JWT claims structure for `SoulAce` auth.

use serde::{Deserialize, Serialize};

/// Account kind the token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Listener,
    Professional,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Listener => "listener",
            Self::Professional => "professional",
            Self::Admin => "admin",
        }
    }
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (account ID).
    pub sub: String,
    /// Display name.
    pub name: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_listener(&self) -> bool {
        self.role == Role::Listener
    }
}
