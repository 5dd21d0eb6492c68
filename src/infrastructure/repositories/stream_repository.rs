use crate::infrastructure::db::DbPool;
use crate::error::AppResult;
use std::sync::Arc;
use uuid::Uuid;

pub struct StreamRepository {
    pool: Arc<DbPool>,
}

impl StreamRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Record which chat a response id belongs to
    pub async fn create(&self, response_id: &str, chat_id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query("INSERT INTO streams (id, chat_id, created_at) VALUES ($1, $2, NOW())")
            .bind(response_id)
            .bind(chat_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
