use crate::infrastructure::db::DbPool;
use crate::{
    domain::chat::{Message, MessagePart, MessageRole},
    error::AppResult,
};
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

pub struct MessageRepository {
    pool: Arc<DbPool>,
}

impl MessageRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Messages of a chat in conversation order
    pub async fn find_by_chat(&self, chat_id: Uuid) -> AppResult<Vec<Message>> {
        let pool = self.pool.as_ref();
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, role, parts, attachments, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Append a text message to a chat
    pub async fn create_text(&self, chat_id: Uuid, role: MessageRole, text: &str) -> AppResult<Message> {
        let pool = self.pool.as_ref();
        let parts = vec![MessagePart::Text {
            text: text.to_string(),
        }];

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, chat_id, role, parts, attachments, created_at)
            VALUES ($1, $2, $3, $4, '[]'::jsonb, clock_timestamp())
            RETURNING id, chat_id, role, parts, attachments, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat_id)
        .bind(role)
        .bind(Json(parts))
        .fetch_one(pool)
        .await?;

        Ok(message)
    }
}
