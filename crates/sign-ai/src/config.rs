//! Configuration for the five AI adapter clients.
//!
//! One struct for all five rather than one config type per client: the
//! adapters share a timeout and an HTTP client, and differ only in base URL
//! and a couple of TTS-specific knobs.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub(crate) cv_base_url: String,
    pub(crate) text_to_gloss_base_url: String,
    pub(crate) gloss_to_text_base_url: String,
    pub(crate) stt_base_url: String,
    pub(crate) tts_base_url: String,
    pub(crate) eleven_api_key: String,
    pub(crate) tts_voice_id: String,
    pub(crate) tts_stability: f32,
    pub(crate) tts_similarity_boost: f32,
    pub(crate) timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            cv_base_url: "http://localhost:8001".to_string(),
            text_to_gloss_base_url: "http://localhost:8002".to_string(),
            gloss_to_text_base_url: "http://localhost:8003".to_string(),
            stt_base_url: "http://localhost:8004".to_string(),
            tts_base_url: "https://api.elevenlabs.io/v1".to_string(),
            eleven_api_key: String::new(),
            tts_voice_id: "Os2frcqCuUz8b9F93RuI".to_string(),
            tts_stability: 0.5,
            tts_similarity_boost: 0.75,
            timeout: Duration::from_secs(30),
        }
    }
}

impl AiConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cv_base_url(mut self, url: impl Into<String>) -> Self {
        self.cv_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_text_to_gloss_base_url(mut self, url: impl Into<String>) -> Self {
        self.text_to_gloss_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_gloss_to_text_base_url(mut self, url: impl Into<String>) -> Self {
        self.gloss_to_text_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_stt_base_url(mut self, url: impl Into<String>) -> Self {
        self.stt_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_tts_base_url(mut self, url: impl Into<String>) -> Self {
        self.tts_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_eleven_api_key(mut self, key: impl Into<String>) -> Self {
        self.eleven_api_key = key.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads from the environment, falling back to defaults. `ELEVEN_API_KEY`
    /// has no usable default; callers that need TTS must set it.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("CV_SERVICE_URL") {
            config.cv_base_url = v;
        }
        if let Ok(v) = std::env::var("TEXT_TO_GLOSS_SERVICE_URL") {
            config.text_to_gloss_base_url = v;
        }
        if let Ok(v) = std::env::var("GLOSS_TO_TEXT_SERVICE_URL") {
            config.gloss_to_text_base_url = v;
        }
        if let Ok(v) = std::env::var("STT_SERVICE_URL") {
            config.stt_base_url = v;
        }
        if let Ok(v) = std::env::var("TTS_SERVICE_URL") {
            config.tts_base_url = v;
        }
        if let Ok(v) = std::env::var("ELEVEN_API_KEY") {
            config.eleven_api_key = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_timeout() {
        assert_eq!(AiConfig::default().timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_overrides_base_url() {
        let config = AiConfig::new().with_cv_base_url("http://cv.internal");
        assert_eq!(config.cv_base_url, "http://cv.internal");
    }
}
