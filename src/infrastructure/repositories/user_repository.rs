use crate::infrastructure::db::DbPool;
use crate::{
    domain::user::{AccountTier, User},
    error::{AppError, AppResult},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Create a new free-tier user
    pub async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, account_type, request_count, request_count_reset_at, created_at, updated_at)
            VALUES ($1, $2, $3, 'free', 0, $4, $4, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("User already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    /// Store a new request counter only if nobody changed it since it was read.
    /// Returns false when the row moved underneath us.
    pub async fn compare_and_set_request_counter(
        &self,
        user_id: Uuid,
        expected_count: i32,
        expected_reset_at: DateTime<Utc>,
        new_count: i32,
        new_reset_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET request_count = $1, request_count_reset_at = $2, updated_at = NOW()
            WHERE id = $3 AND request_count = $4 AND request_count_reset_at = $5
            "#,
        )
        .bind(new_count)
        .bind(new_reset_at)
        .bind(user_id)
        .bind(expected_count)
        .bind(expected_reset_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the nominal plan after a successful checkout
    pub async fn change_plan(&self, user_id: Uuid, tier: AccountTier) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET account_type = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(tier)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Link Stripe references and clear any pending grace period
    pub async fn store_stripe_customer(
        &self,
        user_id: Uuid,
        customer_id: Option<&str>,
        subscription_id: &str,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE users
            SET stripe_customer_id = COALESCE($1, stripe_customer_id),
                stripe_subscription_id = $2,
                subscription_ends_at = NULL,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(customer_id)
        .bind(subscription_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Keep paid access until `ends_at`, after which the effective tier is free
    pub async fn schedule_downgrade(&self, customer_id: &str, ends_at: DateTime<Utc>) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET subscription_ends_at = $1, updated_at = NOW()
            WHERE stripe_customer_id = $2
            "#,
        )
        .bind(ends_at)
        .bind(customer_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Immediate downgrade, no grace period
    pub async fn downgrade_to_free_by_customer(&self, customer_id: &str) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET account_type = 'free',
                stripe_subscription_id = NULL,
                subscription_ends_at = NULL,
                updated_at = NOW()
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
