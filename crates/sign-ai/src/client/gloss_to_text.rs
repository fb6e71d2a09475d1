//! Gloss-token sequence -> natural-language text adapter.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use sign_core::ports::ai::{AiError as PortAiError, GlossToTextPort, NlpOutput};

use super::common::{build_http_client, check_status, map_error};
use super::cv::extract_text_field;
use crate::config::AiConfig;
use crate::error::AiError;

const ADAPTER: &str = "gloss_to_text";

pub struct GlossToTextClient {
    http: reqwest::Client,
    base_url: String,
}

impl GlossToTextClient {
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: build_http_client(config.timeout),
            base_url: config.gloss_to_text_base_url.clone(),
        }
    }

    async fn generate(&self, gloss: &[String]) -> Result<NlpOutput, AiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            gloss: &'a [String],
        }

        let url = format!("{}/generate", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&Body { gloss })
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response.json().await?;
        extract_text_field(&body)
    }
}

#[async_trait]
impl GlossToTextPort for GlossToTextClient {
    async fn gloss_to_text(&self, gloss: &[String]) -> Result<NlpOutput, PortAiError> {
        self.generate(gloss).await.map_err(|e| map_error(ADAPTER, e))
    }
}
