//! Speech-to-text adapter: raw audio upload -> recognized Arabic text.

use async_trait::async_trait;
use serde_json::Value;

use sign_core::ports::ai::{AiError as PortAiError, NlpOutput, SttPort};

use super::common::{build_http_client, check_status, map_error};
use super::cv::extract_text_field;
use super::wav::ensure_wav;
use crate::config::AiConfig;
use crate::error::AiError;

const ADAPTER: &str = "speech_to_text";

pub struct SpeechToTextClient {
    http: reqwest::Client,
    base_url: String,
}

impl SpeechToTextClient {
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: build_http_client(config.timeout),
            base_url: config.stt_base_url.clone(),
        }
    }

    async fn transcribe(&self, audio_bytes: &[u8]) -> Result<NlpOutput, AiError> {
        let wav_bytes = ensure_wav(audio_bytes).await?;
        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("language", "ar")
            .text("task", "transcribe");

        let response = self
            .http
            .post(&self.base_url)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response.json().await?;
        extract_text_field(&body)
    }
}

#[async_trait]
impl SttPort for SpeechToTextClient {
    async fn speech_to_text(&self, audio_bytes: &[u8]) -> Result<NlpOutput, PortAiError> {
        self.transcribe(audio_bytes)
            .await
            .map_err(|e| map_error(ADAPTER, e))
    }
}
