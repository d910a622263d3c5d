//! Data models for `SoulAce` storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use soulace_core::matcher::{AgeCandidate, MoodCandidate};
use soulace_core::{MoodPreference, MoodSet};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: Option<i64>,
    /// JSON array of quadrant codes; `[]` until the user picks a mood.
    pub moods: String,
    pub mood_group: Option<String>,
    pub prefered_mood: String,
    pub is_online: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn age_years(&self) -> Option<u32> {
        self.age.and_then(|a| u32::try_from(a).ok())
    }

    /// Current mood set, `None` if the user has not picked one.
    pub fn mood_set(&self) -> Option<MoodSet> {
        MoodSet::from_json(&self.moods).ok()
    }

    pub fn preference(&self) -> MoodPreference {
        self.prefered_mood.parse().unwrap_or_default()
    }
}

/// A user row paired with its decoded mood set, ready for scoring.
#[derive(Debug, Clone)]
pub struct MoodMatchCandidate {
    pub user: User,
    pub moods: MoodSet,
}

impl MoodMatchCandidate {
    /// Rows whose stored moods do not decode are skipped.
    pub fn from_user(user: User) -> Option<Self> {
        let moods = user.mood_set()?;
        Some(Self { user, moods })
    }
}

impl MoodCandidate for MoodMatchCandidate {
    fn moods(&self) -> &MoodSet {
        &self.moods
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub is_online: i64,
    pub is_busy: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AgeCandidate for Listener {
    fn age(&self) -> Option<u32> {
        u32::try_from(self.age).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: String,
    pub moods: String,
    pub mood_group: String,
    pub prefered_mood: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: String,
    pub created_at: i64,
    pub responded_at: Option<i64>,
}

impl ChatRequest {
    pub fn status(&self) -> ChatRequestStatus {
        self.status.parse().unwrap_or(ChatRequestStatus::Pending)
    }

    pub fn involves(&self, identity: &str) -> bool {
        self.sender_id == identity || self.receiver_id == identity
    }
}

/// Lifecycle of a chat request: pending until the receiver answers once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl ChatRequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for ChatRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown chat request status: {other}")),
        }
    }
}

impl fmt::Display for ChatRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
