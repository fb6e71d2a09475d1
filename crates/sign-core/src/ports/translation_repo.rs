//! Port for persisting translation request records.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::translation::{TranslationRecord, TranslationStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("translation record {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Inserts a new record and returns it with its assigned id.
    async fn create(&self, record: TranslationRecord) -> Result<TranslationRecord, RepositoryError>;

    /// Updates the status and result fields of an existing record.
    async fn update_result(
        &self,
        id: i64,
        status: TranslationStatus,
        result_text: Option<String>,
        result_gloss: Option<Vec<String>>,
        result_audio_base64: Option<String>,
        result_video_url: Option<String>,
    ) -> Result<TranslationRecord, RepositoryError>;

    async fn get(&self, id: i64) -> Result<TranslationRecord, RepositoryError>;

    /// Lists a user's translation history, most recent first.
    async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TranslationRecord>, RepositoryError>;
}
