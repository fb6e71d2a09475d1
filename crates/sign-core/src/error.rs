//! Crate-wide error composition.
//!
//! Leaf errors are defined where they originate (`ports::wallet::WalletError`,
//! `ports::translation_repo::RepositoryError`, `ports::ai::AiError`,
//! `ports::video::VideoError`) and composed here, the way adapter errors are
//! composed one layer up into `HttpError`/`SessionError` in `sign-axum`.

use thiserror::Error;

use crate::ports::ai::AiError;
use crate::ports::translation_repo::RepositoryError;
use crate::ports::video::VideoError;
use crate::ports::wallet::WalletError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
