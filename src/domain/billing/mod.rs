pub mod service;
pub mod webhook;

pub use service::BillingService;
pub use webhook::{compute_signature, parse_event, verify_signature, BillingEvent, WebhookError};
