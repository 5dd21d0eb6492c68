pub mod client;

pub use client::{StripeClient, StripeSubscription};
