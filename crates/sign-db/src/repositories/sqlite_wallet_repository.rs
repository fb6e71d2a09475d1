//! Wallet persistence and transactional credit mutations.
//!
//! Every mutation is one SQL transaction: read the current balance, apply
//! the domain arithmetic in [`sign_core::domain::wallet::Wallet`], write the
//! new balance back, append a transaction-log row, commit. Reset-if-needed
//! is folded into every read so a stale balance never leaks out, matching
//! the original's per-access `reset_if_needed` call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use sign_core::domain::wallet::{CreditTransaction, TransactionKind, Wallet};
use sign_core::ports::wallet::{WalletError, WalletPort};

/// Monthly credit allotment granted to a newly-provisioned free-plan wallet.
const FREE_PLAN_CREDITS_PER_MONTH: i64 = 30;

pub struct SqliteWalletRepository {
    pool: SqlitePool,
}

impl SqliteWalletRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_user_id(&self, user_id: i64) -> Result<Option<Wallet>, WalletError> {
        let row = sqlx::query(
            "SELECT id, user_id, plan_credits_per_month, credits_used, bonus_credits, last_reset
             FROM wallets WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        Ok(row.map(|r| Wallet {
            id: r.get("id"),
            user_id: r.get("user_id"),
            plan_credits_per_month: r.get("plan_credits_per_month"),
            credits_used: r.get("credits_used"),
            bonus_credits: r.get("bonus_credits"),
            last_reset: r.get::<DateTime<Utc>, _>("last_reset"),
        }))
    }

    async fn insert_transaction(
        &self,
        wallet_id: i64,
        amount: i64,
        kind: TransactionKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), WalletError> {
        let kind_str = match kind {
            TransactionKind::Used => "used",
            TransactionKind::Earned => "earned",
        };
        sqlx::query(
            "INSERT INTO credit_transactions (wallet_id, amount, kind, reason, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(wallet_id)
        .bind(amount)
        .bind(kind_str)
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;
        Ok(())
    }

    /// Re-reads the wallet inside its own transaction and persists the
    /// monthly-usage reset atomically, the same shape `consume`/`reward`
    /// use for their read-modify-write.
    async fn reset_in_transaction(&self, user_id: i64, now: DateTime<Utc>) -> Result<Wallet, WalletError> {
        let mut tx = self.pool.begin().await.map_err(|e| WalletError::Database(e.to_string()))?;

        let row = sqlx::query(
            "SELECT id, user_id, plan_credits_per_month, credits_used, bonus_credits, last_reset
             FROM wallets WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?
        .ok_or(WalletError::NotFound(user_id))?;

        let mut wallet = Wallet {
            id: row.get("id"),
            user_id: row.get("user_id"),
            plan_credits_per_month: row.get("plan_credits_per_month"),
            credits_used: row.get("credits_used"),
            bonus_credits: row.get("bonus_credits"),
            last_reset: row.get::<DateTime<Utc>, _>("last_reset"),
        };
        wallet.reset_if_needed(now);

        sqlx::query(
            "UPDATE wallets SET credits_used = ?, bonus_credits = ?, last_reset = ? WHERE id = ?",
        )
        .bind(wallet.credits_used)
        .bind(wallet.bonus_credits)
        .bind(wallet.last_reset)
        .bind(wallet.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        tx.commit().await.map_err(|e| WalletError::Database(e.to_string()))?;
        debug!(user_id, wallet_id = wallet.id, "monthly usage reset committed");
        Ok(wallet)
    }
}

#[async_trait]
impl WalletPort for SqliteWalletRepository {
    async fn get_or_provision(&self, user_id: i64) -> Result<Wallet, WalletError> {
        if let Some(wallet) = self.fetch_by_user_id(user_id).await? {
            let now = Utc::now();
            if wallet.needs_reset(now) {
                return self.reset_in_transaction(user_id, now).await;
            }
            return Ok(wallet);
        }

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO wallets (user_id, plan_credits_per_month, credits_used, bonus_credits, last_reset)
             VALUES (?, ?, 0, 0, ?)",
        )
        .bind(user_id)
        .bind(FREE_PLAN_CREDITS_PER_MONTH)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?
        .last_insert_rowid();

        Ok(Wallet {
            id,
            user_id,
            plan_credits_per_month: FREE_PLAN_CREDITS_PER_MONTH,
            credits_used: 0,
            bonus_credits: 0,
            last_reset: now,
        })
    }

    async fn consume(
        &self,
        user_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<Wallet, WalletError> {
        let mut tx = self.pool.begin().await.map_err(|e| WalletError::Database(e.to_string()))?;

        let row = sqlx::query(
            "SELECT id, user_id, plan_credits_per_month, credits_used, bonus_credits, last_reset
             FROM wallets WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?
        .ok_or(WalletError::NotFound(user_id))?;

        let mut wallet = Wallet {
            id: row.get("id"),
            user_id: row.get("user_id"),
            plan_credits_per_month: row.get("plan_credits_per_month"),
            credits_used: row.get("credits_used"),
            bonus_credits: row.get("bonus_credits"),
            last_reset: row.get::<DateTime<Utc>, _>("last_reset"),
        };

        let now = Utc::now();
        wallet.reset_if_needed(now);
        wallet.consume(amount)?;

        sqlx::query(
            "UPDATE wallets SET credits_used = ?, bonus_credits = ?, last_reset = ? WHERE id = ?",
        )
        .bind(wallet.credits_used)
        .bind(wallet.bonus_credits)
        .bind(wallet.last_reset)
        .bind(wallet.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO credit_transactions (wallet_id, amount, kind, reason, created_at)
             VALUES (?, ?, 'used', ?, ?)",
        )
        .bind(wallet.id)
        .bind(-amount)
        .bind(reason)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        tx.commit().await.map_err(|e| WalletError::Database(e.to_string()))?;
        debug!(user_id, wallet_id = wallet.id, amount, "credit consumption committed");
        Ok(wallet)
    }

    async fn reward(
        &self,
        user_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<Wallet, WalletError> {
        let mut tx = self.pool.begin().await.map_err(|e| WalletError::Database(e.to_string()))?;

        let row = sqlx::query(
            "SELECT id, user_id, plan_credits_per_month, credits_used, bonus_credits, last_reset
             FROM wallets WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?
        .ok_or(WalletError::NotFound(user_id))?;

        let mut wallet = Wallet {
            id: row.get("id"),
            user_id: row.get("user_id"),
            plan_credits_per_month: row.get("plan_credits_per_month"),
            credits_used: row.get("credits_used"),
            bonus_credits: row.get("bonus_credits"),
            last_reset: row.get::<DateTime<Utc>, _>("last_reset"),
        };
        wallet.reward(amount);
        let now = Utc::now();

        sqlx::query("UPDATE wallets SET bonus_credits = ? WHERE id = ?")
            .bind(wallet.bonus_credits)
            .bind(wallet.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO credit_transactions (wallet_id, amount, kind, reason, created_at)
             VALUES (?, ?, 'earned', ?, ?)",
        )
        .bind(wallet.id)
        .bind(amount)
        .bind(reason)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        tx.commit().await.map_err(|e| WalletError::Database(e.to_string()))?;
        debug!(user_id, wallet_id = wallet.id, amount, "credit reward committed");
        Ok(wallet)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransaction>, WalletError> {
        let wallet = self
            .fetch_by_user_id(user_id)
            .await?
            .ok_or(WalletError::NotFound(user_id))?;

        let rows = sqlx::query(
            "SELECT id, wallet_id, amount, kind, reason, created_at FROM credit_transactions
             WHERE wallet_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(wallet.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let kind_str: String = r.get("kind");
                CreditTransaction {
                    id: r.get("id"),
                    wallet_id: r.get("wallet_id"),
                    amount: r.get("amount"),
                    kind: if kind_str == "earned" {
                        TransactionKind::Earned
                    } else {
                        TransactionKind::Used
                    },
                    reason: r.get("reason"),
                    created_at: r.get::<DateTime<Utc>, _>("created_at"),
                }
            })
            .collect())
    }
}
