//! Text-to-speech adapter, backed by ElevenLabs.

use async_trait::async_trait;
use serde::Serialize;

use sign_core::ports::ai::{AiError as PortAiError, TtsPort};

use super::common::{build_http_client, check_status, map_error};
use crate::config::AiConfig;
use crate::error::AiError;

const ADAPTER: &str = "text_to_speech";

pub struct TextToSpeechClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    stability: f32,
    similarity_boost: f32,
}

impl TextToSpeechClient {
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: build_http_client(config.timeout),
            base_url: config.tts_base_url.clone(),
            api_key: config.eleven_api_key.clone(),
            voice_id: config.tts_voice_id.clone(),
            stability: config.tts_stability,
            similarity_boost: config.tts_similarity_boost,
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError> {
        #[derive(Serialize)]
        struct VoiceSettings {
            stability: f32,
            similarity_boost: f32,
        }

        #[derive(Serialize)]
        struct Body<'a> {
            text: &'a str,
            model_id: &'static str,
            voice_settings: VoiceSettings,
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&Body {
                text,
                model_id: "eleven_multilingual_v2",
                voice_settings: VoiceSettings {
                    stability: self.stability,
                    similarity_boost: self.similarity_boost,
                },
            })
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TtsPort for TextToSpeechClient {
    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, PortAiError> {
        self.synthesize(text)
            .await
            .map_err(|e| map_error(ADAPTER, e))
    }
}
