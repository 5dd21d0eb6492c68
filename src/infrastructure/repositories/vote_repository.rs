use crate::infrastructure::db::DbPool;
use crate::{
    domain::chat::Vote,
    error::{AppError, AppResult},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct VoteRepository {
    pool: Arc<DbPool>,
}

impl VoteRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub async fn find_by_chat(&self, chat_id: Uuid) -> AppResult<Vec<Vote>> {
        let pool = self.pool.as_ref();
        let votes = sqlx::query_as::<_, Vote>(
            "SELECT chat_id, message_id, is_upvoted FROM votes WHERE chat_id = $1",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await?;

        Ok(votes)
    }

    /// Insert or flip a vote. The message must belong to the chat.
    pub async fn upsert(&self, chat_id: Uuid, message_id: Uuid, is_upvoted: bool) -> AppResult<Vote> {
        let pool = self.pool.as_ref();
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (chat_id, message_id, is_upvoted)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM messages WHERE id = $2 AND chat_id = $1)
            ON CONFLICT (chat_id, message_id) DO UPDATE SET is_upvoted = EXCLUDED.is_upvoted
            RETURNING chat_id, message_id, is_upvoted
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(is_upvoted)
        .fetch_optional(pool)
        .await?;

        vote.ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }
}
