//! Health and online-list endpoints.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::{AppState, AuthUser};

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let online = state.relay.online_identities().await.len();
    let connections = state.relay.connection_count().await;
    Json(json!({
        "success": true,
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "online": online,
        "connections": connections,
    }))
}

/// `GET /api/online`
pub async fn online(_caller: AuthUser, State(state): State<AppState>) -> Json<Value> {
    let users = state.relay.online_identities().await;
    Json(json!({ "success": true, "users": users }))
}
