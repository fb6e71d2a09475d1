//! Port for wallet persistence and transactional credit mutations.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::wallet::{CreditTransaction, Wallet};
use crate::domain::wallet::WalletError as DomainWalletError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Domain(#[from] DomainWalletError),

    #[error("no wallet provisioned for user {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(String),
}

/// Adapters (`sign-db::SqliteWalletRepository`) implement this against a
/// real connection pool; the orchestrator and the session controller only
/// ever see this trait object.
#[async_trait]
pub trait WalletPort: Send + Sync {
    /// Returns the user's wallet, provisioning a free-plan wallet on first
    /// access if none exists yet (mirrors the original's get-or-create view).
    async fn get_or_provision(&self, user_id: i64) -> Result<Wallet, WalletError>;

    /// Applies `reset_if_needed` then deducts `amount` credits and appends a
    /// `used` transaction row, atomically. Fails with
    /// [`DomainWalletError::InsufficientCredits`] if the balance is too low.
    async fn consume(&self, user_id: i64, amount: i64, reason: &str)
        -> Result<Wallet, WalletError>;

    /// Adds `amount` bonus credits and appends an `earned` transaction row,
    /// atomically.
    async fn reward(&self, user_id: i64, amount: i64, reason: &str)
        -> Result<Wallet, WalletError>;

    /// Lists recent transactions for a user's wallet, most recent first.
    async fn list_transactions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransaction>, WalletError>;
}
