//! Persisted translation request record and its small enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which way the translation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sign video/frames in, text or voice out.
    FromSign,
    /// Text or voice in, sign video out.
    ToSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Frames,
    Text,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Text,
    Voice,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Processing,
    Completed,
    Failed,
}

/// Whether the record was produced by the one-shot REST pipelines or the
/// long-lived WebSocket streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Batch,
    Streaming,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: i64,
    pub user_id: i64,
    pub direction: Direction,
    pub input_type: InputType,
    pub output_type: OutputType,
    pub mode: ProcessingMode,
    pub status: TranslationStatus,
    pub result_text: Option<String>,
    pub result_gloss: Option<Vec<String>>,
    pub result_audio_base64: Option<String>,
    pub result_video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationRecord {
    /// A fresh in-progress record, as created at the start of a pipeline run
    /// or when a streaming session's `start` action is accepted.
    #[must_use]
    pub fn new_processing(
        user_id: i64,
        direction: Direction,
        input_type: InputType,
        output_type: OutputType,
        mode: ProcessingMode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            direction,
            input_type,
            output_type,
            mode,
            status: TranslationStatus::Processing,
            result_text: None,
            result_gloss: None,
            result_audio_base64: None,
            result_video_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
