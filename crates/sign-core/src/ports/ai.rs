//! Ports for the five external AI model adapters.
//!
//! Every adapter speaks a slightly different JSON shape (`text`, `output`,
//! `gloss_translation`, `gloss`...); callers normalize through [`NlpOutput`]
//! rather than matching on adapter-specific keys, so the orchestrator never
//! needs to know which backend produced a value.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request to {adapter} failed: {message}")]
    Request { adapter: &'static str, message: String },

    #[error("{adapter} returned an unexpected response shape")]
    UnexpectedResponse { adapter: &'static str },

    #[error("{adapter} timed out")]
    Timeout { adapter: &'static str },

    #[error("{adapter} requires authentication")]
    AuthRequired { adapter: &'static str },

    #[error("{adapter} rate-limited the request")]
    RateLimited { adapter: &'static str },
}

/// A normalized AI adapter response: either a gloss-token sequence or free
/// text. Pipelines extract whichever variant they expect and error on the
/// other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NlpOutput {
    Gloss(Vec<String>),
    Text(String),
}

impl NlpOutput {
    pub fn into_text(self) -> Option<String> {
        match self {
            NlpOutput::Text(t) => Some(t),
            NlpOutput::Gloss(_) => None,
        }
    }

    pub fn into_gloss(self) -> Option<Vec<String>> {
        match self {
            NlpOutput::Gloss(g) => Some(g),
            NlpOutput::Text(_) => None,
        }
    }
}

/// Computer vision: sign-video frames in, gloss/text out.
#[async_trait]
pub trait CvPort: Send + Sync {
    async fn sign_to_gloss(&self, frames_base64: &[String]) -> Result<NlpOutput, AiError>;
}

/// Text -> gloss-token sequence.
#[async_trait]
pub trait TextToGlossPort: Send + Sync {
    async fn text_to_gloss(&self, text: &str) -> Result<NlpOutput, AiError>;
}

/// Gloss-token sequence -> natural-language text.
#[async_trait]
pub trait GlossToTextPort: Send + Sync {
    async fn gloss_to_text(&self, gloss: &[String]) -> Result<NlpOutput, AiError>;
}

/// Speech -> text. `audio_bytes` is the raw upload; adapters are
/// responsible for any format conversion their backend requires.
#[async_trait]
pub trait SttPort: Send + Sync {
    async fn speech_to_text(&self, audio_bytes: &[u8]) -> Result<NlpOutput, AiError>;
}

/// Text -> synthesized speech, returned as raw audio bytes.
#[async_trait]
pub trait TtsPort: Send + Sync {
    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nlp_output_extracts_matching_variant_only() {
        let text = NlpOutput::Text("hello".to_string());
        assert_eq!(text.clone().into_text(), Some("hello".to_string()));
        assert_eq!(text.into_gloss(), None);

        let gloss = NlpOutput::Gloss(vec!["a".to_string()]);
        assert_eq!(gloss.clone().into_gloss(), Some(vec!["a".to_string()]));
        assert_eq!(gloss.into_text(), None);
    }
}
