use crate::domain::user::AccountTier;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,
    #[error("Malformed Stripe-Signature header")]
    MalformedSignature,
    #[error("Webhook timestamp outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Verify a `t=<unix>,v1=<hex>` signature header against the raw payload
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;

    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();
    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::MalformedSignature)?)
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }
    if (now.timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let matches = signatures.iter().any(|signature| {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    });

    if matches {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, the v1 scheme
pub fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Subscription lifecycle transitions the service reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted {
        user_id: Uuid,
        customer_id: Option<String>,
        subscription_id: String,
        plan: Option<AccountTier>,
    },
    SubscriptionDeleted {
        customer_id: String,
        current_period_end: DateTime<Utc>,
    },
    FinalPaymentFailed {
        customer_id: String,
    },
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: Value,
}

fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Parse a verified payload into the event it represents
pub fn parse_event(payload: &[u8], now: DateTime<Utc>) -> Result<BillingEvent, WebhookError> {
    let event: RawEvent =
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    let object = &event.data.object;

    let parsed = match event.event_type.as_str() {
        "checkout.session.completed" => {
            let user_id = str_field(object, "client_reference_id").and_then(|id| Uuid::parse_str(id).ok());
            let subscription_id = str_field(object, "subscription");

            match (user_id, subscription_id) {
                (Some(user_id), Some(subscription_id)) => BillingEvent::CheckoutCompleted {
                    user_id,
                    customer_id: str_field(object, "customer").map(str::to_string),
                    subscription_id: subscription_id.to_string(),
                    plan: object
                        .get("metadata")
                        .and_then(|metadata| str_field(metadata, "plan"))
                        .and_then(|plan| plan.parse().ok()),
                },
                _ => BillingEvent::Ignored(event.event_type.clone()),
            }
        }
        "customer.subscription.deleted" => {
            let customer_id = str_field(object, "customer")
                .ok_or_else(|| WebhookError::InvalidPayload("subscription without customer".to_string()))?;
            BillingEvent::SubscriptionDeleted {
                customer_id: customer_id.to_string(),
                current_period_end: period_end(object).unwrap_or(now),
            }
        }
        "invoice.payment_failed" => {
            let final_attempt = object
                .get("next_payment_attempt")
                .map(Value::is_null)
                .unwrap_or(true);
            match (final_attempt, str_field(object, "customer")) {
                (true, Some(customer_id)) => BillingEvent::FinalPaymentFailed {
                    customer_id: customer_id.to_string(),
                },
                _ => BillingEvent::Ignored(event.event_type.clone()),
            }
        }
        other => BillingEvent::Ignored(other.to_string()),
    };

    Ok(parsed)
}

/// Paid-through instant of a subscription. Newer API versions carry it on the items.
fn period_end(subscription: &Value) -> Option<DateTime<Utc>> {
    subscription
        .get("current_period_end")
        .and_then(Value::as_i64)
        .or_else(|| {
            subscription
                .pointer("/items/data/0/current_period_end")
                .and_then(Value::as_i64)
        })
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
