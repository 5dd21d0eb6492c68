use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{domain::billing::BillingService, error::AppResult};

const STRIPE_SIGNATURE: &str = "stripe-signature";

pub struct BillingController {
    billing_service: Arc<BillingService>,
}

impl BillingController {
    pub fn new(billing_service: Arc<BillingService>) -> Self {
        Self { billing_service }
    }

    /// POST /stripe/webhook - Signed subscription lifecycle events
    pub async fn webhook(
        State(controller): State<Arc<BillingController>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Json<Value>> {
        let signature = headers.get(STRIPE_SIGNATURE).and_then(|v| v.to_str().ok());
        controller.billing_service.handle_webhook(&body, signature).await?;
        Ok(Json(json!({ "received": true })))
    }
}
