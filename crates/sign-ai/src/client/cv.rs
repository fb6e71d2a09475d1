//! Computer vision adapter: sign-video frames -> recognized text.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use sign_core::ports::ai::{AiError as PortAiError, CvPort, NlpOutput};

use super::common::{build_http_client, check_status, map_error};
use super::gloss_fields::extract_gloss_field;
use crate::config::AiConfig;
use crate::error::AiError;

const ADAPTER: &str = "computer_vision";

pub struct ComputerVisionClient {
    http: reqwest::Client,
    base_url: String,
}

impl ComputerVisionClient {
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: build_http_client(config.timeout),
            base_url: config.cv_base_url.clone(),
        }
    }

    async fn predict(&self, frames_base64: &[String]) -> Result<NlpOutput, AiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            frames: &'a [String],
        }

        let url = format!("{}/predict", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&Body {
                frames: frames_base64,
            })
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response.json().await?;
        extract_cv_output(&body)
    }
}

/// The CV backend's response is bimodal: `{gloss: [...]}` when it resolves
/// sign tokens directly, `{text: ...}`/`{output: ...}` when it only manages
/// a text transcription. A `gloss` field takes priority when present.
pub(super) fn extract_cv_output(body: &Value) -> Result<NlpOutput, AiError> {
    if body.get("gloss").is_some() {
        return extract_gloss_field(body);
    }
    extract_text_field(body)
}

/// Mirrors the original's `_extract_text`: a `text` or `output` string
/// field, case-insensitively preferred in that order.
pub(super) fn extract_text_field(body: &Value) -> Result<NlpOutput, AiError> {
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| body.get("output").and_then(Value::as_str));

    match text {
        Some(t) if !t.trim().is_empty() => Ok(NlpOutput::Text(t.to_string())),
        _ => Err(AiError::InvalidResponse {
            message: "response had no usable text/output field".to_string(),
        }),
    }
}

#[async_trait]
impl CvPort for ComputerVisionClient {
    async fn sign_to_gloss(&self, frames_base64: &[String]) -> Result<NlpOutput, PortAiError> {
        self.predict(frames_base64)
            .await
            .map_err(|e| map_error(ADAPTER, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_field() {
        let body = serde_json::json!({"text": "hello"});
        assert_eq!(
            extract_text_field(&body).unwrap(),
            NlpOutput::Text("hello".to_string())
        );
    }

    #[test]
    fn falls_back_to_output_field() {
        let body = serde_json::json!({"output": "hi there"});
        assert_eq!(
            extract_text_field(&body).unwrap(),
            NlpOutput::Text("hi there".to_string())
        );
    }

    #[test]
    fn rejects_empty_response() {
        let body = serde_json::json!({});
        assert!(extract_text_field(&body).is_err());
    }

    #[test]
    fn cv_output_prefers_gloss_when_present() {
        let body = serde_json::json!({"gloss": ["HELLO"]});
        assert_eq!(
            extract_cv_output(&body).unwrap(),
            NlpOutput::Gloss(vec!["HELLO".to_string()])
        );
    }

    #[test]
    fn cv_output_falls_back_to_text_without_gloss() {
        let body = serde_json::json!({"text": "hello"});
        assert_eq!(
            extract_cv_output(&body).unwrap(),
            NlpOutput::Text("hello".to_string())
        );
    }
}
