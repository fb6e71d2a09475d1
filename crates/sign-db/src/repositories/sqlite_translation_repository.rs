//! Persistence for translation request records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use sign_core::domain::translation::{
    Direction, InputType, OutputType, ProcessingMode, TranslationRecord, TranslationStatus,
};
use sign_core::ports::translation_repo::{RepositoryError, TranslationRepository};

pub struct SqliteTranslationRepository {
    pool: SqlitePool,
}

impl SqliteTranslationRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> TranslationRecord {
        let direction: String = row.get("direction");
        let input_type: String = row.get("input_type");
        let output_type: String = row.get("output_type");
        let mode: String = row.get("mode");
        let status: String = row.get("status");
        let gloss_json: Option<String> = row.get("result_gloss");

        TranslationRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            direction: parse_direction(&direction),
            input_type: parse_input_type(&input_type),
            output_type: parse_output_type(&output_type),
            mode: parse_mode(&mode),
            status: parse_status(&status),
            result_text: row.get("result_text"),
            result_gloss: gloss_json.and_then(|j| serde_json::from_str(&j).ok()),
            result_audio_base64: row.get("result_audio_base64"),
            result_video_url: row.get("result_video_url"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        }
    }
}

fn direction_str(d: Direction) -> &'static str {
    match d {
        Direction::FromSign => "from_sign",
        Direction::ToSign => "to_sign",
    }
}

fn parse_direction(s: &str) -> Direction {
    match s {
        "to_sign" => Direction::ToSign,
        _ => Direction::FromSign,
    }
}

fn input_type_str(t: InputType) -> &'static str {
    match t {
        InputType::Frames => "frames",
        InputType::Text => "text",
        InputType::Voice => "voice",
    }
}

fn parse_input_type(s: &str) -> InputType {
    match s {
        "text" => InputType::Text,
        "voice" => InputType::Voice,
        _ => InputType::Frames,
    }
}

fn output_type_str(t: OutputType) -> &'static str {
    match t {
        OutputType::Text => "text",
        OutputType::Voice => "voice",
        OutputType::Video => "video",
    }
}

fn parse_output_type(s: &str) -> OutputType {
    match s {
        "voice" => OutputType::Voice,
        "video" => OutputType::Video,
        _ => OutputType::Text,
    }
}

fn mode_str(m: ProcessingMode) -> &'static str {
    match m {
        ProcessingMode::Batch => "batch",
        ProcessingMode::Streaming => "streaming",
    }
}

fn parse_mode(s: &str) -> ProcessingMode {
    match s {
        "streaming" => ProcessingMode::Streaming,
        _ => ProcessingMode::Batch,
    }
}

fn status_str(s: TranslationStatus) -> &'static str {
    match s {
        TranslationStatus::Processing => "processing",
        TranslationStatus::Completed => "completed",
        TranslationStatus::Failed => "failed",
    }
}

fn parse_status(s: &str) -> TranslationStatus {
    match s {
        "completed" => TranslationStatus::Completed,
        "failed" => TranslationStatus::Failed,
        _ => TranslationStatus::Processing,
    }
}

#[async_trait]
impl TranslationRepository for SqliteTranslationRepository {
    async fn create(
        &self,
        record: TranslationRecord,
    ) -> Result<TranslationRecord, RepositoryError> {
        let gloss_json = record
            .result_gloss
            .as_ref()
            .map(|g| serde_json::to_string(g).unwrap_or_default());

        let id = sqlx::query(
            "INSERT INTO translation_records
                (user_id, direction, input_type, output_type, mode, status,
                 result_text, result_gloss, result_audio_base64, result_video_url,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(direction_str(record.direction))
        .bind(input_type_str(record.input_type))
        .bind(output_type_str(record.output_type))
        .bind(mode_str(record.mode))
        .bind(status_str(record.status))
        .bind(&record.result_text)
        .bind(&gloss_json)
        .bind(&record.result_audio_base64)
        .bind(&record.result_video_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .last_insert_rowid();

        self.get(id).await
    }

    async fn update_result(
        &self,
        id: i64,
        status: TranslationStatus,
        result_text: Option<String>,
        result_gloss: Option<Vec<String>>,
        result_audio_base64: Option<String>,
        result_video_url: Option<String>,
    ) -> Result<TranslationRecord, RepositoryError> {
        let gloss_json = result_gloss.map(|g| serde_json::to_string(&g).unwrap_or_default());
        let now = Utc::now();

        let affected = sqlx::query(
            "UPDATE translation_records
             SET status = ?, result_text = ?, result_gloss = ?, result_audio_base64 = ?,
                 result_video_url = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(status_str(status))
        .bind(&result_text)
        .bind(&gloss_json)
        .bind(&result_audio_base64)
        .bind(&result_video_url)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .rows_affected();

        if affected == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        self.get(id).await
    }

    async fn get(&self, id: i64) -> Result<TranslationRecord, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, direction, input_type, output_type, mode, status,
                    result_text, result_gloss, result_audio_base64, result_video_url,
                    created_at, updated_at
             FROM translation_records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound(id))?;

        Ok(Self::row_to_record(&row))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TranslationRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, direction, input_type, output_type, mode, status,
                    result_text, result_gloss, result_audio_base64, result_video_url,
                    created_at, updated_at
             FROM translation_records WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    async fn repo() -> SqliteTranslationRepository {
        let pool = setup_test_database().await.unwrap();
        SqliteTranslationRepository::new(pool)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let repo = repo().await;
        let record = TranslationRecord::new_processing(
            1,
            Direction::FromSign,
            InputType::Frames,
            OutputType::Text,
            ProcessingMode::Streaming,
        );
        let created = repo.create(record).await.unwrap();
        assert!(created.id > 0);
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.user_id, 1);
        assert_eq!(fetched.status, TranslationStatus::Processing);
    }

    #[tokio::test]
    async fn update_result_persists_text_and_status() {
        let repo = repo().await;
        let record = TranslationRecord::new_processing(
            2,
            Direction::FromSign,
            InputType::Frames,
            OutputType::Text,
            ProcessingMode::Streaming,
        );
        let created = repo.create(record).await.unwrap();
        let updated = repo
            .update_result(
                created.id,
                TranslationStatus::Completed,
                Some("hello".to_string()),
                None,
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TranslationStatus::Completed);
        assert_eq!(updated.result_text, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let repo = repo().await;
        let result = repo
            .update_result(9999, TranslationStatus::Completed, None, None, None, None)
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound(9999))));
    }

    #[tokio::test]
    async fn list_for_user_orders_most_recent_first() {
        let repo = repo().await;
        for _ in 0..3 {
            let record = TranslationRecord::new_processing(
                5,
                Direction::ToSign,
                InputType::Text,
                OutputType::Video,
                ProcessingMode::Batch,
            );
            repo.create(record).await.unwrap();
        }
        let list = repo.list_for_user(5, 10).await.unwrap();
        assert_eq!(list.len(), 3);
    }
}
