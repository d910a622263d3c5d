//! Profile upsert for users and listeners.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::auth::Role;

use super::{ApiError, ApiJson, AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
}

/// `PUT /api/profile`
///
/// Creates or updates the caller's profile. Listeners must give an age since
/// listener matching is by age.
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn upsert(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    let profile = match caller.0.role {
        Role::User => {
            let user = state.db.upsert_user(caller.id(), name, body.age).await?;
            json!(user)
        }
        Role::Listener => {
            let age = body
                .age
                .ok_or_else(|| ApiError::BadRequest("Listeners must provide an age".into()))?;
            let listener = state.db.upsert_listener(caller.id(), name, age).await?;
            json!(listener)
        }
        other => {
            return Err(ApiError::Forbidden(format!(
                "Role {} has no profile here",
                other.as_str()
            )));
        }
    };

    info!(role = caller.0.role.as_str(), "Profile saved");
    Ok(Json(json!({ "success": true, "profile": profile })))
}
