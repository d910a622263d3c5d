//! JWT token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use soulace_core::db::unix_timestamp;

use super::claims::{Claims, Role};

/// Manages JWT token creation and validation.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a session token. Used by the account service and by tooling.
    pub fn issue(
        &self,
        subject: &str,
        name: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = unix_timestamp();
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: subject.to_string(),
            name: name.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}
