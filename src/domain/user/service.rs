use super::{dto::*, error::UserServiceError, AccountTier, User};
use crate::{domain::quota, infrastructure::repositories::UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    user_repo: Arc<UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
pub trait UserServiceApi: Send + Sync {
    /// Profile with effective tier and monthly request budget
    async fn get_profile(&self, user_id: Uuid) -> Result<ProfileResponse, UserServiceError>;

    async fn get_request_info(&self, user_id: Uuid) -> Result<RequestInfo, UserServiceError>;

    /// Tier after applying any lapsed grace period
    async fn get_effective_tier(&self, user_id: Uuid) -> Result<AccountTier, UserServiceError>;
}

#[async_trait]
impl UserServiceApi for UserService {
    async fn get_profile(&self, user_id: Uuid) -> Result<ProfileResponse, UserServiceError> {
        let user = self.find_user(user_id).await?;
        let now = Utc::now();

        Ok(ProfileResponse {
            id: user.id,
            email: user.email.clone(),
            account_type: user.account_type.to_string(),
            effective_tier: user.effective_tier_at(now).to_string(),
            subscription_ends_at: user.subscription_ends_at,
            has_billing_account: user
                .stripe_customer_id
                .as_deref()
                .map(|id| !id.is_empty())
                .unwrap_or(false),
            request_info: build_request_info(&user, now),
        })
    }

    async fn get_request_info(&self, user_id: Uuid) -> Result<RequestInfo, UserServiceError> {
        let user = self.find_user(user_id).await?;
        Ok(build_request_info(&user, Utc::now()))
    }

    async fn get_effective_tier(&self, user_id: Uuid) -> Result<AccountTier, UserServiceError> {
        let user = self.find_user(user_id).await?;
        Ok(user.effective_tier())
    }
}

impl UserService {
    async fn find_user(&self, user_id: Uuid) -> Result<User, UserServiceError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserServiceError::NotFound)
    }
}

pub fn build_request_info(user: &User, now: DateTime<Utc>) -> RequestInfo {
    let tier = user.effective_tier_at(now);
    let limit = tier.monthly_request_limit();
    let used = quota::used_this_month(user.request_count, user.request_count_reset_at, now);

    RequestInfo {
        tier: tier.to_string(),
        used,
        limit,
        remaining: quota::remaining(user.request_count, user.request_count_reset_at, now, limit),
        resets_at: quota::next_reset(now),
    }
}
