use super::webhook::{parse_event, verify_signature, BillingEvent};
use crate::{
    domain::user::AccountTier,
    error::{AppError, AppResult},
    infrastructure::{repositories::UserRepository, stripe::StripeClient},
};
use chrono::Utc;
use std::sync::Arc;

/// Applies verified Stripe webhook events to user plans
pub struct BillingService {
    user_repo: Arc<UserRepository>,
    stripe_client: Option<Arc<StripeClient>>,
    webhook_secret: String,
}

impl BillingService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        stripe_client: Option<Arc<StripeClient>>,
        webhook_secret: String,
    ) -> Self {
        Self {
            user_repo,
            stripe_client,
            webhook_secret,
        }
    }

    /// Verify, parse and apply one webhook delivery
    pub async fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> AppResult<BillingEvent> {
        if self.webhook_secret.is_empty() {
            tracing::error!("Webhook received but no signing secret is configured");
            return Err(AppError::BadRequest(
                "Webhook signing secret not configured".to_string(),
            ));
        }

        let now = Utc::now();
        verify_signature(payload, signature, &self.webhook_secret, now).map_err(|e| {
            tracing::warn!(error = %e, "Rejected webhook signature");
            AppError::BadRequest(e.to_string())
        })?;

        let event = parse_event(payload, now).map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.apply(&event).await?;

        Ok(event)
    }

    async fn apply(&self, event: &BillingEvent) -> AppResult<()> {
        match event {
            BillingEvent::CheckoutCompleted {
                user_id,
                customer_id,
                subscription_id,
                plan,
            } => {
                let plan = match plan {
                    Some(plan) => *plan,
                    None => self.plan_from_subscription(subscription_id).await,
                };

                if !self.user_repo.change_plan(*user_id, plan).await? {
                    tracing::warn!(user_id = %user_id, "Checkout completed for unknown user");
                    return Ok(());
                }
                self.user_repo
                    .store_stripe_customer(*user_id, customer_id.as_deref(), subscription_id)
                    .await?;

                tracing::info!(user_id = %user_id, plan = %plan, "Subscription started");
            }
            BillingEvent::SubscriptionDeleted {
                customer_id,
                current_period_end,
            } => {
                let updated = self
                    .user_repo
                    .schedule_downgrade(customer_id, *current_period_end)
                    .await?;
                tracing::info!(
                    customer_id = %customer_id,
                    grace_ends_at = %current_period_end,
                    updated,
                    "Subscription cancelled, grace period scheduled"
                );
            }
            BillingEvent::FinalPaymentFailed { customer_id } => {
                let updated = self.user_repo.downgrade_to_free_by_customer(customer_id).await?;
                tracing::info!(customer_id = %customer_id, updated, "Final payment failed, downgraded to free");
            }
            BillingEvent::Ignored(event_type) => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
            }
        }

        Ok(())
    }

    /// Plan from the subscription's metadata, falling back to advanced
    async fn plan_from_subscription(&self, subscription_id: &str) -> AccountTier {
        let Some(client) = &self.stripe_client else {
            return AccountTier::Advanced;
        };

        match client.subscription_plan(subscription_id).await {
            Ok(Some(plan)) => plan.parse().unwrap_or(AccountTier::Advanced),
            Ok(None) => AccountTier::Advanced,
            Err(e) => {
                tracing::error!(subscription_id = %subscription_id, error = %e, "Subscription lookup failed");
                AccountTier::Advanced
            }
        }
    }
}
