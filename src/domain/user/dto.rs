use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monthly request budget, as returned by GET /chat/request_info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub tier: String,
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
    pub resets_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub account_type: String,
    pub effective_tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub has_billing_account: bool,
    pub request_info: RequestInfo,
}
