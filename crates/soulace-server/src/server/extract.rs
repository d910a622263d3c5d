//! Request extractors: caller identity and JSON bodies.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Claims;

use super::AppState;
use super::error::ApiError;

/// Validated claims of the calling account.
///
/// The token is taken from `Authorization: Bearer <token>`, falling back to
/// a `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.sub
    }

    /// Reject callers whose token was not issued for a user account.
    pub fn require_user(&self) -> Result<(), ApiError> {
        if self.0.is_user() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Only users can do this".into()))
        }
    }

    pub fn require_listener(&self) -> Result<(), ApiError> {
        if self.0.is_listener() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Only listeners can do this".into()))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized("Missing token".into()))?;

        let claims = state.jwt.validate(&token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(Self(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}

/// `Json` with parse failures reported as 400 in the API envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_is_read() {
        let p = parts(&[("authorization", "Bearer abc.def")]);
        assert_eq!(bearer_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let p = parts(&[("authorization", "Basic abc")]);
        assert!(bearer_token(&p).is_none());
    }

    #[test]
    fn token_cookie_is_read() {
        let p = parts(&[("cookie", "theme=dark; token=xyz; other=1")]);
        assert_eq!(cookie_token(&p).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let p = parts(&[("cookie", "theme=dark")]);
        assert!(cookie_token(&p).is_none());
    }
}
