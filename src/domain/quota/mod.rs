//! Monthly request budget: a pure decision over the stored counter.

use chrono::{DateTime, Datelike, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum QuotaDecision {
    Allowed {
        /// Counter value to persist
        count: i32,
        /// Reset timestamp to persist
        reset_at: DateTime<Utc>,
        rolled_over: bool,
    },
    Rejected {
        remaining: i32,
        cost: i32,
    },
}

/// Decide whether a request of `cost` fits into `limit` given the stored
/// counter. A reset timestamp outside the current calendar month counts as
/// zero usage.
pub fn evaluate(
    stored_count: i32,
    stored_reset_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cost: i32,
    limit: i32,
) -> QuotaDecision {
    let rolled_over = !same_month(stored_reset_at, now);
    let current = if rolled_over { 0 } else { stored_count };

    if current + cost > limit {
        return QuotaDecision::Rejected {
            remaining: (limit - current).max(0),
            cost,
        };
    }

    QuotaDecision::Allowed {
        count: current + cost,
        reset_at: if rolled_over { now } else { stored_reset_at },
        rolled_over,
    }
}

/// Requests left this month without charging anything
pub fn remaining(stored_count: i32, stored_reset_at: DateTime<Utc>, now: DateTime<Utc>, limit: i32) -> i32 {
    let used = used_this_month(stored_count, stored_reset_at, now);
    (limit - used).max(0)
}

pub fn used_this_month(stored_count: i32, stored_reset_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    if same_month(stored_reset_at, now) {
        stored_count
    } else {
        0
    }
}

/// First instant of the next calendar month (UTC)
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
