use crate::infrastructure::db::DbPool;
use crate::{domain::chat::Chat, error::AppResult};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct ChatRepository {
    pool: Arc<DbPool>,
}

impl ChatRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// All chats of a user, newest first
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Chat>> {
        let pool = self.pool.as_ref();
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, title, visibility, created_at, updated_at
            FROM chats
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(chats)
    }

    pub async fn find_by_id(&self, chat_id: Uuid) -> AppResult<Option<Chat>> {
        let pool = self.pool.as_ref();
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, title, visibility, created_at, updated_at
            FROM chats
            WHERE id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;

        Ok(chat)
    }

    /// Create a private chat
    pub async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Chat> {
        let pool = self.pool.as_ref();
        let now = Utc::now();
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (id, user_id, title, visibility, created_at, updated_at)
            VALUES ($1, $2, $3, 'private', $4, $4)
            RETURNING id, user_id, title, visibility, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(chat)
    }

    /// Refresh the title of an owned chat. Returns None if the chat is gone or not owned.
    pub async fn update_title(&self, chat_id: Uuid, user_id: Uuid, title: &str) -> AppResult<Option<Chat>> {
        let pool = self.pool.as_ref();
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            UPDATE chats
            SET title = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, visibility, created_at, updated_at
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(chat)
    }

    /// Delete an owned chat; messages, votes and streams cascade
    pub async fn delete(&self, chat_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
