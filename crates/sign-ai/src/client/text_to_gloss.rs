//! Text -> gloss-token sequence adapter.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use sign_core::ports::ai::{AiError as PortAiError, NlpOutput, TextToGlossPort};

use super::common::{build_http_client, check_status, map_error};
use super::gloss_fields::extract_gloss_field;
use crate::config::AiConfig;
use crate::error::AiError;

const ADAPTER: &str = "text_to_gloss";

pub struct TextToGlossClient {
    http: reqwest::Client,
    base_url: String,
}

impl TextToGlossClient {
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: build_http_client(config.timeout),
            base_url: config.text_to_gloss_base_url.clone(),
        }
    }

    async fn generate(&self, text: &str) -> Result<NlpOutput, AiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            prompt: &'a str,
        }

        let url = format!("{}/generate", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&Body { prompt: text.trim() })
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response.json().await?;
        extract_gloss_field(&body)
    }
}

#[async_trait]
impl TextToGlossPort for TextToGlossClient {
    async fn text_to_gloss(&self, text: &str) -> Result<NlpOutput, PortAiError> {
        self.generate(text).await.map_err(|e| map_error(ADAPTER, e))
    }
}
