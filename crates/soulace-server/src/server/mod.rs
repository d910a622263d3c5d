//! HTTP API and WebSocket endpoint for `SoulAce` server.

pub mod chat;
pub mod error;
pub mod extract;
pub mod matching;
pub mod mood;
pub mod presence;
pub mod profile;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use soulace_core::config::MatchingConfig;

use crate::auth::JwtManager;
use crate::router::RelayRouter;
use crate::storage::SoulaceDatabase;

pub use error::ApiError;
pub use extract::{ApiJson, AuthUser};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: SoulaceDatabase,
    pub jwt: Arc<JwtManager>,
    pub relay: RelayRouter,
    pub matching: Arc<MatchingConfig>,
}

impl AppState {
    pub fn new(
        db: SoulaceDatabase,
        jwt: Arc<JwtManager>,
        relay: RelayRouter,
        matching: MatchingConfig,
    ) -> Self {
        Self {
            db,
            jwt,
            relay,
            matching: Arc::new(matching),
        }
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(presence::health))
        .route("/ws", get(ws::upgrade))
        .route("/api/online", get(presence::online))
        .route("/api/profile", put(profile::upsert))
        .route("/api/mood", put(mood::update).get(mood::current))
        .route("/api/match/mood", post(matching::match_mood))
        .route("/api/match/listener", post(matching::match_listener))
        .route("/api/listener/release", post(matching::release_listener))
        .route("/api/chat-requests", post(chat::create))
        .route("/api/chat-requests/incoming", get(chat::incoming))
        .route("/api/chat-requests/{id}", get(chat::get))
        .route("/api/chat-requests/{id}/respond", post(chat::respond))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
