use crate::infrastructure::db::DbPool;
use crate::{domain::feedback::Feedback, error::AppResult};
use std::sync::Arc;
use uuid::Uuid;

pub struct FeedbackRepository {
    pool: Arc<DbPool>,
}

impl FeedbackRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, email: &str, note: &str, plan: &str) -> AppResult<Feedback> {
        let pool = self.pool.as_ref();
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (id, email, note, plan, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, email, note, plan, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(note)
        .bind(plan)
        .fetch_one(pool)
        .await?;

        Ok(feedback)
    }
}
