//! Mood matching and nearest-age listener matching.

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use soulace_core::matcher::{best_mood_match, nearest_age};

use crate::storage::{DatabaseError, Listener, MoodMatchCandidate, SoulaceDatabase};

use super::mood::MoodRequest;
use super::{ApiError, ApiJson, AppState, AuthUser};

/// `POST /api/match/mood`
///
/// Finds the best-scoring online user for the submitted moods. Invalid moods
/// are rejected before storage is touched.
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn match_mood(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MoodRequest>,
) -> Result<Json<Value>, ApiError> {
    let (moods, preference) = body.parse()?;
    caller.require_user()?;

    let targets = moods.group().targets(preference);
    let candidates: Vec<MoodMatchCandidate> = state
        .db
        .mood_candidates(caller.id(), &targets)
        .await?
        .into_iter()
        .filter_map(MoodMatchCandidate::from_user)
        .collect();
    debug!(candidates = candidates.len(), group = %moods.group(), "Scoring mood candidates");

    let Some(found) = best_mood_match(&moods, preference, &candidates) else {
        info!(preference = preference.as_str(), "No mood match");
        return Err(ApiError::NotFound(state.matching.fallback_message.clone()));
    };

    let matched = &found.candidate.user;
    info!(matched = %matched.id, score = found.score, "Mood match found");
    Ok(Json(json!({
        "success": true,
        "match": {
            "userId": matched.id,
            "name": matched.name,
            "moods": found.candidate.moods,
            "moodGroup": found.candidate.moods.group(),
            "score": found.score,
        },
    })))
}

/// `POST /api/match/listener`
///
/// Claims the free online listener closest in age to the caller. A lost
/// claim moves on to the next-best listener, up to the configured number of
/// attempts.
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn match_listener(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    caller.require_user()?;

    let user = state.db.get_user(caller.id()).await?;
    let age = user
        .age_years()
        .ok_or_else(|| ApiError::BadRequest("Set your age before requesting a listener".into()))?;

    let claimed =
        claim_nearest_listener(&state.db, age, state.matching.listener_claim_attempts).await?;
    let Some(listener) = claimed else {
        info!("No listener available");
        return Err(ApiError::NotFound(state.matching.fallback_message.clone()));
    };

    Ok(Json(json!({
        "success": true,
        "listener": {
            "id": listener.id,
            "name": listener.name,
            "age": listener.age,
        },
    })))
}

/// Where free listeners are read from and claimed.
#[async_trait]
pub trait ListenerPool: Send + Sync {
    async fn available(&self) -> Result<Vec<Listener>, DatabaseError>;

    /// `false` when someone else got there first.
    async fn claim(&self, id: &str) -> Result<bool, DatabaseError>;
}

#[async_trait]
impl ListenerPool for SoulaceDatabase {
    async fn available(&self) -> Result<Vec<Listener>, DatabaseError> {
        self.available_listeners().await
    }

    async fn claim(&self, id: &str) -> Result<bool, DatabaseError> {
        self.claim_listener(id).await
    }
}

/// Claim the free listener nearest to `age`, re-reading the pool after each
/// lost claim. `None` once the pool is empty or `attempts` run out.
pub async fn claim_nearest_listener(
    pool: &dyn ListenerPool,
    age: u32,
    attempts: u32,
) -> Result<Option<Listener>, DatabaseError> {
    for attempt in 1..=attempts {
        let listeners = pool.available().await?;
        let Some(listener) = nearest_age(age, &listeners) else {
            return Ok(None);
        };

        if pool.claim(&listener.id).await? {
            info!(listener = %listener.id, attempt, "Listener assigned");
            return Ok(Some(listener.clone()));
        }

        warn!(listener = %listener.id, attempt, "Listener claimed by someone else, retrying");
    }
    Ok(None)
}

/// `POST /api/listener/release`
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn release_listener(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    caller.require_listener()?;

    let released = state.db.release_listener(caller.id()).await?;
    if released {
        info!("Listener released");
    }
    Ok(Json(json!({ "success": true, "released": released })))
}
