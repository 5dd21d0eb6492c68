use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::collections::HashMap;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub current_period_end: Option<i64>,
}

/// Minimal Stripe REST client for the lookups the webhook needs
pub struct StripeClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl StripeClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, STRIPE_API_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http_client: reqwest::Client::new(),
        }
    }

    /// Retrieve a subscription by id
    pub async fn get_subscription(&self, subscription_id: &str) -> AppResult<StripeSubscription> {
        let response = self
            .http_client
            .get(format!("{}/subscriptions/{}", self.base_url, subscription_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Stripe request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "Stripe subscription lookup failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<StripeSubscription>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse Stripe subscription: {}", e)))
    }

    /// The `plan` metadata of a subscription, if any
    pub async fn subscription_plan(&self, subscription_id: &str) -> AppResult<Option<String>> {
        let subscription = self.get_subscription(subscription_id).await?;
        Ok(subscription.metadata.get("plan").cloned())
    }
}
