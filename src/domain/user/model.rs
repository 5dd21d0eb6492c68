use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub account_type: AccountTier,
    pub request_count: i32,
    pub request_count_reset_at: DateTime<Utc>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account tier, ordered by rank: free < advanced < pro
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountTier {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "advanced")]
    Advanced,
    #[serde(rename = "pro")]
    Pro,
}

impl AccountTier {
    pub fn rank(self) -> u8 {
        match self {
            AccountTier::Free => 0,
            AccountTier::Advanced => 1,
            AccountTier::Pro => 2,
        }
    }

    /// Weighted requests allowed per calendar month
    pub fn monthly_request_limit(self) -> i32 {
        match self {
            AccountTier::Free => 50,
            AccountTier::Advanced => 500,
            AccountTier::Pro => 2000,
        }
    }

    /// Human-facing plan name used in upgrade prompts
    pub fn plan_name(self) -> &'static str {
        match self {
            AccountTier::Free => "Free",
            AccountTier::Advanced => "Advanced",
            AccountTier::Pro => "Pro",
        }
    }
}

impl std::fmt::Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountTier::Free => write!(f, "free"),
            AccountTier::Advanced => write!(f, "advanced"),
            AccountTier::Pro => write!(f, "pro"),
        }
    }
}

impl std::str::FromStr for AccountTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(AccountTier::Free),
            "advanced" => Ok(AccountTier::Advanced),
            "pro" => Ok(AccountTier::Pro),
            other => Err(format!("Unknown account tier: {}", other)),
        }
    }
}

impl User {
    /// Tier the user is entitled to right now. A lapsed grace period means free,
    /// whatever the stored tier says.
    pub fn effective_tier_at(&self, now: DateTime<Utc>) -> AccountTier {
        effective_tier(self.account_type, self.subscription_ends_at, now)
    }

    pub fn effective_tier(&self) -> AccountTier {
        self.effective_tier_at(Utc::now())
    }
}

pub fn effective_tier(
    nominal: AccountTier,
    subscription_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AccountTier {
    match subscription_ends_at {
        Some(ends_at) if now > ends_at => AccountTier::Free,
        _ => nominal,
    }
}
