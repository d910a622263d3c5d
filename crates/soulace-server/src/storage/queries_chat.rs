//! Chat request queries for `SoulAce` server.

use soulace_core::db::{DatabaseError, unix_timestamp};

use super::db::SoulaceDatabase;
use super::models::{ChatRequest, ChatRequestStatus};

impl SoulaceDatabase {
    /// Record a new pending chat request.
    pub async fn create_chat_request(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<ChatRequest, DatabaseError> {
        sqlx::query(
            "INSERT INTO chat_requests (id, sender_id, receiver_id, status, created_at) VALUES (?, ?, ?, 'pending', ?)",
        )
        .bind(id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        self.get_chat_request(id).await
    }

    pub async fn get_chat_request(&self, id: &str) -> Result<ChatRequest, DatabaseError> {
        sqlx::query_as::<_, ChatRequest>("SELECT * FROM chat_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Chat request {id}")))
    }

    /// Pending requests addressed to `receiver_id`, oldest first.
    pub async fn incoming_chat_requests(
        &self,
        receiver_id: &str,
    ) -> Result<Vec<ChatRequest>, DatabaseError> {
        let requests = sqlx::query_as::<_, ChatRequest>(
            "SELECT * FROM chat_requests WHERE receiver_id = ? AND status = 'pending' ORDER BY created_at, rowid",
        )
        .bind(receiver_id)
        .fetch_all(self.pool())
        .await?;

        Ok(requests)
    }

    /// Answer a pending request on behalf of its receiver.
    ///
    /// Only a `pending` row addressed to `receiver_id` changes; returns
    /// `false` otherwise, so an answered request never changes again.
    pub async fn respond_chat_request(
        &self,
        id: &str,
        receiver_id: &str,
        status: ChatRequestStatus,
    ) -> Result<bool, DatabaseError> {
        if status == ChatRequestStatus::Pending {
            return Ok(false);
        }

        let result = sqlx::query(
            "UPDATE chat_requests SET status = ?, responded_at = ?
             WHERE id = ? AND receiver_id = ? AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(unix_timestamp())
        .bind(id)
        .bind(receiver_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
