//! Credit wallet domain model.
//!
//! The arithmetic here is pure and unit-testable; `sign-db`'s
//! `SqliteWalletRepository` is responsible for applying it atomically (one
//! SQL transaction per mutation, reset-if-needed as a compare-and-swap
//! rather than an in-process lock).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub plan_type: String,
    pub credits_per_month: i64,
    pub price: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Used,
    Earned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: i64,
    pub wallet_id: i64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// A user's subscription-backed credit balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub plan_credits_per_month: i64,
    pub credits_used: i64,
    pub bonus_credits: i64,
    pub last_reset: DateTime<Utc>,
}

const RESET_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("insufficient credits: requested {requested}, remaining {remaining}")]
    InsufficientCredits { requested: i64, remaining: i64 },
}

impl Wallet {
    /// Total credits available this billing period, before usage.
    #[must_use]
    pub fn total_credits(&self) -> i64 {
        self.plan_credits_per_month + self.bonus_credits
    }

    /// Whether `last_reset` is more than [`RESET_PERIOD_DAYS`] in the past.
    #[must_use]
    pub fn needs_reset(&self, now: DateTime<Utc>) -> bool {
        now - self.last_reset >= ChronoDuration::days(RESET_PERIOD_DAYS)
    }

    /// Zeroes usage and bumps `last_reset` if the period has elapsed.
    /// No-op otherwise. Callers apply this before reading or mutating the
    /// balance, matching the original's `reset_if_needed`-on-every-access
    /// pattern.
    pub fn reset_if_needed(&mut self, now: DateTime<Utc>) {
        if self.needs_reset(now) {
            self.credits_used = 0;
            self.last_reset = now;
        }
    }

    /// Credits left after `reset_if_needed` has been applied.
    #[must_use]
    pub fn remaining_credits(&self) -> i64 {
        (self.total_credits() - self.credits_used).max(0)
    }

    #[must_use]
    pub fn can_consume(&self, amount: i64) -> bool {
        self.remaining_credits() >= amount
    }

    /// Deducts `amount` credits, failing if the balance is insufficient.
    pub fn consume(&mut self, amount: i64) -> Result<(), WalletError> {
        let remaining = self.remaining_credits();
        if remaining < amount {
            return Err(WalletError::InsufficientCredits {
                requested: amount,
                remaining,
            });
        }
        self.credits_used += amount;
        Ok(())
    }

    /// Adds bonus credits, e.g. for a dataset contribution reward.
    pub fn reward(&mut self, amount: i64) {
        self.bonus_credits += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(plan_credits: i64, used: i64, bonus: i64, last_reset: DateTime<Utc>) -> Wallet {
        Wallet {
            id: 1,
            user_id: 1,
            plan_credits_per_month: plan_credits,
            credits_used: used,
            bonus_credits: bonus,
            last_reset,
        }
    }

    #[test]
    fn remaining_credits_accounts_for_bonus() {
        let w = wallet(10, 3, 5, Utc::now());
        assert_eq!(w.remaining_credits(), 12);
    }

    #[test]
    fn consume_deducts_and_errors_when_insufficient() {
        let mut w = wallet(5, 0, 0, Utc::now());
        w.consume(1).unwrap();
        assert_eq!(w.remaining_credits(), 4);
        let mut empty = wallet(0, 0, 0, Utc::now());
        assert_eq!(
            empty.consume(1),
            Err(WalletError::InsufficientCredits {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn reset_if_needed_clears_usage_after_period() {
        let stale = Utc::now() - ChronoDuration::days(31);
        let mut w = wallet(10, 10, 0, stale);
        assert!(w.needs_reset(Utc::now()));
        w.reset_if_needed(Utc::now());
        assert_eq!(w.credits_used, 0);
        assert_eq!(w.remaining_credits(), 10);
    }

    #[test]
    fn reset_if_needed_is_noop_within_period() {
        let recent = Utc::now() - ChronoDuration::days(5);
        let mut w = wallet(10, 4, 0, recent);
        w.reset_if_needed(Utc::now());
        assert_eq!(w.credits_used, 4);
    }

    #[test]
    fn reward_increases_bonus_credits() {
        let mut w = wallet(10, 10, 0, Utc::now());
        assert_eq!(w.remaining_credits(), 0);
        w.reward(10);
        assert_eq!(w.remaining_credits(), 10);
    }
}
