//! One-shot REST pipelines (C2), as opposed to the streaming session (C4):
//! `text -> sign`, `voice -> sign`, `sign -> text`, `sign -> voice`. Each
//! debits one credit up front (no refund on pipeline failure, matching the
//! streaming session's policy) and persists a `TranslationRecord` with
//! `mode: batch`. `text_to_sign`/`voice_to_sign` additionally render a clip
//! through the video assembler (C6), since their output is a sign video
//! rather than gloss text alone.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sign_core::domain::translation::{
    Direction, InputType, OutputType, ProcessingMode, TranslationRecord, TranslationStatus,
};
use sign_core::error::CoreError;

use crate::error::HttpError;
use crate::state::AppState;

const TRANSLATION_COST_CREDITS: i64 = 1;

#[derive(Debug, Deserialize)]
pub struct TextToSignRequest {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SignToTextRequest {
    pub user_id: i64,
    pub frames: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub translation_id: i64,
    pub text: Option<String>,
    pub gloss: Option<Vec<String>>,
    pub audio_base64: Option<String>,
    pub video_url: Option<String>,
}

async fn start_record(
    state: &AppState,
    user_id: i64,
    direction: Direction,
    input_type: InputType,
    output_type: OutputType,
) -> Result<TranslationRecord, HttpError> {
    state
        .repos
        .wallet
        .consume(user_id, TRANSLATION_COST_CREDITS, "batch_translation")
        .await
        .map_err(CoreError::from)?;

    let record = TranslationRecord::new_processing(
        user_id,
        direction,
        input_type,
        output_type,
        ProcessingMode::Batch,
    );
    state
        .repos
        .translations
        .create(record)
        .await
        .map_err(CoreError::from)
        .map_err(HttpError::from)
}

async fn finish_record(
    state: &AppState,
    id: i64,
    status: TranslationStatus,
    text: Option<String>,
    gloss: Option<Vec<String>>,
    audio_base64: Option<String>,
    video_url: Option<String>,
) -> Result<(), HttpError> {
    state
        .repos
        .translations
        .update_result(id, status, text, gloss, audio_base64, video_url)
        .await
        .map_err(CoreError::from)?;
    Ok(())
}

pub async fn text_to_sign(
    State(state): State<AppState>,
    Json(body): Json<TextToSignRequest>,
) -> Result<Json<TranslationResponse>, HttpError> {
    let record = start_record(
        &state,
        body.user_id,
        Direction::ToSign,
        InputType::Text,
        OutputType::Video,
    )
    .await?;

    let result = state.orchestrator.text_to_sign(&body.text).await;
    let (status, gloss, video_url) = match result {
        Ok(r) => {
            let gloss = r.gloss.unwrap_or_default();
            match state.video.assemble(&gloss).await {
                Ok(url) => (TranslationStatus::Completed, Some(gloss), Some(url)),
                Err(err) => {
                    finish_record(&state, record.id, TranslationStatus::Failed, None, Some(gloss.clone()), None, None)
                        .await?;
                    return Err(HttpError::from(err));
                }
            }
        }
        Err(err) => {
            finish_record(&state, record.id, TranslationStatus::Failed, None, None, None, None).await?;
            return Err(HttpError::from(err));
        }
    };

    finish_record(&state, record.id, status, None, gloss.clone(), None, video_url.clone()).await?;

    Ok(Json(TranslationResponse {
        translation_id: record.id,
        text: None,
        gloss,
        audio_base64: None,
        video_url,
    }))
}

pub async fn voice_to_sign(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranslationResponse>, HttpError> {
    let mut user_id: Option<i64> = None;
    let mut audio_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("user_id") => {
                let text = field.text().await.map_err(|e| HttpError::BadRequest(e.to_string()))?;
                user_id = text.parse().ok();
            }
            Some("audio") => {
                let bytes = field.bytes().await.map_err(|e| HttpError::BadRequest(e.to_string()))?;
                audio_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| HttpError::BadRequest("missing user_id field".into()))?;
    let audio_bytes = audio_bytes.ok_or_else(|| HttpError::BadRequest("missing audio field".into()))?;

    let record = start_record(
        &state,
        user_id,
        Direction::ToSign,
        InputType::Voice,
        OutputType::Video,
    )
    .await?;

    let pipeline_result = match state.orchestrator.voice_to_sign(&audio_bytes).await {
        Ok(r) => r,
        Err(err) => {
            finish_record(&state, record.id, TranslationStatus::Failed, None, None, None, None).await?;
            return Err(HttpError::from(err));
        }
    };

    let gloss = pipeline_result.gloss.unwrap_or_default();
    let video_url = match state.video.assemble(&gloss).await {
        Ok(url) => url,
        Err(err) => {
            finish_record(
                &state,
                record.id,
                TranslationStatus::Failed,
                pipeline_result.text.clone(),
                Some(gloss.clone()),
                None,
                None,
            )
            .await?;
            return Err(HttpError::from(err));
        }
    };

    finish_record(
        &state,
        record.id,
        TranslationStatus::Completed,
        pipeline_result.text.clone(),
        Some(gloss.clone()),
        None,
        Some(video_url.clone()),
    )
    .await?;

    Ok(Json(TranslationResponse {
        translation_id: record.id,
        text: pipeline_result.text,
        gloss: Some(gloss),
        audio_base64: None,
        video_url: Some(video_url),
    }))
}

pub async fn sign_to_text(
    State(state): State<AppState>,
    Json(body): Json<SignToTextRequest>,
) -> Result<Json<TranslationResponse>, HttpError> {
    let record = start_record(
        &state,
        body.user_id,
        Direction::FromSign,
        InputType::Frames,
        OutputType::Text,
    )
    .await?;

    let result = match state.orchestrator.sign_to_text(&body.frames).await {
        Ok(r) => r,
        Err(err) => {
            finish_record(&state, record.id, TranslationStatus::Failed, None, None, None, None).await?;
            return Err(HttpError::from(err));
        }
    };

    finish_record(
        &state,
        record.id,
        TranslationStatus::Completed,
        result.text.clone(),
        None,
        None,
        None,
    )
    .await?;

    Ok(Json(TranslationResponse {
        translation_id: record.id,
        text: result.text,
        gloss: None,
        audio_base64: None,
        video_url: None,
    }))
}

pub async fn sign_to_voice(
    State(state): State<AppState>,
    Json(body): Json<SignToTextRequest>,
) -> Result<Json<TranslationResponse>, HttpError> {
    let record = start_record(
        &state,
        body.user_id,
        Direction::FromSign,
        InputType::Frames,
        OutputType::Voice,
    )
    .await?;

    let result = match state.orchestrator.sign_to_voice(&body.frames).await {
        Ok(r) => r,
        Err(err) => {
            finish_record(&state, record.id, TranslationStatus::Failed, None, None, None, None).await?;
            return Err(HttpError::from(err));
        }
    };

    let audio_base64 = result.audio.map(|bytes| {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine as _;
        BASE64.encode(bytes)
    });

    finish_record(
        &state,
        record.id,
        TranslationStatus::Completed,
        result.text.clone(),
        None,
        audio_base64.clone(),
        None,
    )
    .await?;

    Ok(Json(TranslationResponse {
        translation_id: record.id,
        text: result.text,
        gloss: None,
        audio_base64,
        video_url: None,
    }))
}
