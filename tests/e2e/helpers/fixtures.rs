use anyhow::Result;
use chrono::{DateTime, Utc};
use luira_chat_backend::domain::{
    auth::password::hash_password,
    chat::{Chat, Message, MessageRole},
    user::{AccountTier, User},
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestFixtures {
    pool: PgPool,
}

impl TestFixtures {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str) -> Result<User> {
        self.create_user_with_tier(email, AccountTier::Free).await
    }

    pub async fn create_user_with_tier(&self, email: &str, tier: AccountTier) -> Result<User> {
        let password_hash = hash_password(TEST_PASSWORD)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, account_type, request_count_reset_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, email, password_hash, account_type, request_count,
                      request_count_reset_at, stripe_customer_id, stripe_subscription_id,
                      subscription_ends_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .bind(tier)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn set_request_count(&self, user_id: Uuid, count: i32) -> Result<()> {
        sqlx::query("UPDATE users SET request_count = $2, request_count_reset_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(count)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_stripe_customer(&self, user_id: Uuid, customer_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET stripe_customer_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn create_chat(&self, user_id: Uuid, title: &str, created_at: DateTime<Utc>) -> Result<Chat> {
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
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(chat)
    }

    pub async fn create_message(&self, chat_id: Uuid, role: MessageRole, text: &str) -> Result<Message> {
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
        .bind(json!([{ "type": "text", "text": text }]))
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn count_messages_for_user(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages m JOIN chats c ON c.id = m.chat_id WHERE c.user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    pub async fn count_chats(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    pub async fn messages_in_chat(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE chat_id = $1 ORDER BY created_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn feedback_rows(&self) -> Result<Vec<(String, String, String)>> {
        let rows = sqlx::query_as("SELECT email, note, plan FROM feedback ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
