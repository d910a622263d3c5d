//! Current mood and mood history.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use soulace_core::{MoodError, MoodPreference, MoodSet};

use crate::storage::MoodEntry;

use super::{ApiError, ApiJson, AppState, AuthUser};

/// Body shared by mood updates and mood matching.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRequest {
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub prefered_mood: Option<String>,
}

impl MoodRequest {
    /// Validate the body. A missing preference means `similar`.
    pub fn parse(&self) -> Result<(MoodSet, MoodPreference), MoodError> {
        let moods = MoodSet::parse(&self.moods)?;
        let preference = match self.prefered_mood.as_deref() {
            Some(raw) => raw.parse()?,
            None => MoodPreference::default(),
        };
        Ok((moods, preference))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    moods: Option<MoodSet>,
    mood_group: String,
    prefered_mood: String,
    created_at: i64,
}

impl From<MoodEntry> for HistoryEntry {
    fn from(entry: MoodEntry) -> Self {
        Self {
            moods: MoodSet::from_json(&entry.moods).ok(),
            mood_group: entry.mood_group,
            prefered_mood: entry.prefered_mood,
            created_at: entry.created_at,
        }
    }
}

/// `PUT /api/mood`
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn update(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MoodRequest>,
) -> Result<Json<Value>, ApiError> {
    caller.require_user()?;
    let (moods, preference) = body.parse()?;

    let user = state
        .db
        .update_user_mood(caller.id(), &moods, preference)
        .await?;

    info!(group = %moods.group(), preference = preference.as_str(), "Mood updated");
    Ok(Json(json!({
        "success": true,
        "moods": moods,
        "moodGroup": user.mood_group,
        "preferedMood": user.preference().as_str(),
    })))
}

/// `GET /api/mood`
#[instrument(skip_all, fields(caller = %caller.id()))]
pub async fn current(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    caller.require_user()?;

    let user = state.db.get_user(caller.id()).await?;
    let history: Vec<HistoryEntry> = state
        .db
        .mood_history(caller.id(), state.matching.mood_history_limit)
        .await?
        .into_iter()
        .map(HistoryEntry::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "moods": user.mood_set(),
        "moodGroup": user.mood_group,
        "preferedMood": user.preference().as_str(),
        "history": history,
    })))
}
