//! Database setup and schema initialization.
//!
//! Entry points call [`setup_database`] with the resolved on-disk path;
//! tests use [`setup_test_database`] for an in-memory pool with the same
//! schema. Every statement is `IF NOT EXISTS`, so this is safe to call on
//! every startup rather than gating behind a migration marker.

use std::path::Path;

use anyhow::Result;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};

pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_schema(&pool).await?;
    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wallets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            plan_credits_per_month INTEGER NOT NULL,
            credits_used INTEGER NOT NULL DEFAULT 0,
            bonus_credits INTEGER NOT NULL DEFAULT 0,
            last_reset TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credit_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK(kind IN ('used', 'earned')),
            reason TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (wallet_id) REFERENCES wallets(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_credit_transactions_wallet_id ON credit_transactions(wallet_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translation_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            direction TEXT NOT NULL CHECK(direction IN ('from_sign', 'to_sign')),
            input_type TEXT NOT NULL CHECK(input_type IN ('frames', 'text', 'voice')),
            output_type TEXT NOT NULL CHECK(output_type IN ('text', 'voice', 'video')),
            mode TEXT NOT NULL CHECK(mode IN ('batch', 'streaming')),
            status TEXT NOT NULL CHECK(status IN ('processing', 'completed', 'failed')),
            result_text TEXT,
            result_gloss TEXT,
            result_audio_base64 TEXT,
            result_video_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_translation_records_user_id ON translation_records(user_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
