//! Profile, mood and listener queries for `SoulAce` server.

use soulace_core::db::{DatabaseError, unix_timestamp};
use soulace_core::{MoodGroup, MoodPreference, MoodSet};

use super::db::SoulaceDatabase;
use super::models::{Listener, MoodEntry, User};

impl SoulaceDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a user profile or update its name and age.
    pub async fn upsert_user(
        &self,
        id: &str,
        name: &str,
        age: Option<u32>,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, name, age, created_at, updated_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, age = excluded.age, updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(age.map(i64::from))
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Store the user's current moods and append them to the history.
    pub async fn update_user_mood(
        &self,
        id: &str,
        moods: &MoodSet,
        preference: MoodPreference,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();
        let moods_json = moods.to_json();
        let group = moods.group();

        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "UPDATE users SET moods = ?, mood_group = ?, prefered_mood = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&moods_json)
        .bind(group.as_str())
        .bind(preference.as_str())
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }

        sqlx::query(
            "INSERT INTO mood_entries (user_id, moods, mood_group, prefered_mood, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&moods_json)
        .bind(group.as_str())
        .bind(preference.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_user(id).await
    }

    /// Most recent mood entries for a user, newest first.
    pub async fn mood_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<MoodEntry>, DatabaseError> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            "SELECT * FROM mood_entries WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Online users other than `exclude_id` whose mood group is one of
    /// `groups`, in insertion order.
    pub async fn mood_candidates(
        &self,
        exclude_id: &str,
        groups: &[MoodGroup],
    ) -> Result<Vec<User>, DatabaseError> {
        let Some(first) = groups.first() else {
            return Ok(Vec::new());
        };
        let second = groups.get(1).unwrap_or(first);

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE is_online = 1 AND id != ? AND moods != '[]'
               AND (mood_group = ? OR mood_group = ?)
             ORDER BY rowid",
        )
        .bind(exclude_id)
        .bind(first.as_str())
        .bind(second.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(users)
    }

    // =========================================================================
    // Listener queries
    // =========================================================================

    /// Create a listener profile or update its name and age.
    pub async fn upsert_listener(
        &self,
        id: &str,
        name: &str,
        age: u32,
    ) -> Result<Listener, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO listeners (id, name, age, created_at, updated_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, age = excluded.age, updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(i64::from(age))
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_listener(id).await
    }

    /// Get a listener by ID.
    pub async fn get_listener(&self, id: &str) -> Result<Listener, DatabaseError> {
        sqlx::query_as::<_, Listener>("SELECT * FROM listeners WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Listener {id}")))
    }

    /// Online listeners not currently claimed, in insertion order.
    pub async fn available_listeners(&self) -> Result<Vec<Listener>, DatabaseError> {
        let listeners = sqlx::query_as::<_, Listener>(
            "SELECT * FROM listeners WHERE is_online = 1 AND is_busy = 0 ORDER BY rowid",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(listeners)
    }

    /// Mark a listener busy only if it is online and free.
    ///
    /// Returns `false` when someone else claimed it first.
    pub async fn claim_listener(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE listeners SET is_busy = 1, updated_at = ? WHERE id = ? AND is_busy = 0 AND is_online = 1",
        )
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear a listener's busy flag. Returns `false` if it was not busy.
    pub async fn release_listener(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE listeners SET is_busy = 0, updated_at = ? WHERE id = ? AND is_busy = 1",
        )
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Presence
    // =========================================================================

    /// Mirror relay presence onto whichever profile `id` has.
    ///
    /// Going offline also frees a listener.
    pub async fn set_online(&self, id: &str, online: bool) -> Result<u64, DatabaseError> {
        let now = unix_timestamp();
        let flag = i64::from(online);

        let users = sqlx::query("UPDATE users SET is_online = ?, updated_at = ? WHERE id = ?")
            .bind(flag)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        let listeners = if online {
            sqlx::query("UPDATE listeners SET is_online = 1, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(id)
                .execute(self.pool())
                .await?
        } else {
            sqlx::query(
                "UPDATE listeners SET is_online = 0, is_busy = 0, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?
        };

        Ok(users.rows_affected() + listeners.rows_affected())
    }

    /// Whether `id` has a user or listener profile.
    pub async fn account_exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let (exists,): (i64,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?) OR EXISTS(SELECT 1 FROM listeners WHERE id = ?)",
        )
        .bind(id)
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        Ok(exists != 0)
    }
}
