//! The four one-shot translation pipelines (C2): text-to-sign,
//! voice-to-sign, sign-to-text, sign-to-voice. The streaming session (C4)
//! reuses `sign_to_text` per batch instead of going through here directly,
//! since it needs the partial-result bookkeeping the one-shot pipelines
//! don't.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::gloss::{self, GlossError};
use crate::ports::ai::{AiError, CvPort, GlossToTextPort, NlpOutput, SttPort, TextToGlossPort, TtsPort};

/// Runs one adapter call, logging its stage name, request id and elapsed
/// milliseconds on completion (success or failure alike).
async fn stage<T, E, F>(request_id: Uuid, name: &'static str, fut: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = fut.await;
    info!(
        request_id = %request_id,
        stage = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        ok = result.is_ok(),
        "pipeline stage finished"
    );
    result
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Gloss(#[from] GlossError),

    #[error("{0}")]
    InvalidInput(String),
}

/// Outcome of a one-shot pipeline run. Fields are populated according to
/// which pipeline produced the result; callers know which fields to expect
/// from the method they called.
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    pub text: Option<String>,
    pub gloss: Option<Vec<String>>,
    pub audio: Option<Vec<u8>>,
}

/// Composes the AI adapter ports into the request-scoped pipelines.
/// Adapter instances are shared, not per-request, matching the original's
/// class-level client reuse.
pub struct PipelineOrchestrator {
    cv: Arc<dyn CvPort>,
    text_to_gloss: Arc<dyn TextToGlossPort>,
    gloss_to_text: Arc<dyn GlossToTextPort>,
    stt: Arc<dyn SttPort>,
    tts: Arc<dyn TtsPort>,
}

impl PipelineOrchestrator {
    #[must_use]
    pub fn new(
        cv: Arc<dyn CvPort>,
        text_to_gloss: Arc<dyn TextToGlossPort>,
        gloss_to_text: Arc<dyn GlossToTextPort>,
        stt: Arc<dyn SttPort>,
        tts: Arc<dyn TtsPort>,
    ) -> Self {
        Self {
            cv,
            text_to_gloss,
            gloss_to_text,
            stt,
            tts,
        }
    }

    fn require_text(input: &str) -> Result<&str, PipelineError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidInput("text must not be empty".into()));
        }
        Ok(trimmed)
    }

    fn require_frames(frames: &[String]) -> Result<(), PipelineError> {
        if frames.is_empty() {
            return Err(PipelineError::InvalidInput("no frames provided".into()));
        }
        Ok(())
    }

    /// Text -> gloss-token sequence, validated against the closed sign
    /// vocabulary.
    #[instrument(skip(self))]
    pub async fn text_to_sign(&self, text: &str) -> Result<PipelineResult, PipelineError> {
        let text = Self::require_text(text)?;
        let request_id = Uuid::new_v4();
        let nlp = stage(request_id, "text_to_gloss", self.text_to_gloss.text_to_gloss(text)).await?;
        let gloss = extract_gloss(nlp)?;
        Ok(PipelineResult {
            gloss: Some(gloss),
            ..Default::default()
        })
    }

    /// Voice upload -> transcribed text -> gloss-token sequence.
    #[instrument(skip(self, audio_bytes))]
    pub async fn voice_to_sign(&self, audio_bytes: &[u8]) -> Result<PipelineResult, PipelineError> {
        if audio_bytes.is_empty() {
            return Err(PipelineError::InvalidInput("no audio provided".into()));
        }
        let request_id = Uuid::new_v4();
        let transcribed = stage(request_id, "stt", self.stt.speech_to_text(audio_bytes)).await?;
        let text = extract_text(transcribed)?;
        let nlp = stage(request_id, "text_to_gloss", self.text_to_gloss.text_to_gloss(&text)).await?;
        let gloss = extract_gloss(nlp)?;
        Ok(PipelineResult {
            text: Some(text),
            gloss: Some(gloss),
            ..Default::default()
        })
    }

    /// Sign-video frames -> gloss (CV) -> recognized text (gloss_to_text).
    /// The workhorse of the streaming session's batch loop as well as the
    /// one-shot REST endpoint.
    #[instrument(skip(self, frames_base64))]
    pub async fn sign_to_text(
        &self,
        frames_base64: &[String],
    ) -> Result<PipelineResult, PipelineError> {
        Self::require_frames(frames_base64)?;
        let (_, text) = self.recognize_text(frames_base64).await?;
        Ok(PipelineResult {
            text: Some(text),
            ..Default::default()
        })
    }

    /// Sign-video frames -> recognized text -> synthesized speech.
    #[instrument(skip(self, frames_base64))]
    pub async fn sign_to_voice(
        &self,
        frames_base64: &[String],
    ) -> Result<PipelineResult, PipelineError> {
        Self::require_frames(frames_base64)?;
        let (request_id, text) = self.recognize_text(frames_base64).await?;
        let audio = stage(request_id, "tts", self.tts.text_to_speech(&text)).await?;
        Ok(PipelineResult {
            text: Some(text),
            audio: Some(audio),
            ..Default::default()
        })
    }

    /// CV -> gloss tokens -> gloss_to_text -> text, shared by `sign_to_text`
    /// and `sign_to_voice`. Returns the request id alongside the text so
    /// `sign_to_voice` can continue logging under the same id.
    async fn recognize_text(&self, frames_base64: &[String]) -> Result<(Uuid, String), PipelineError> {
        let request_id = Uuid::new_v4();
        let cv_output = stage(request_id, "cv", self.cv.sign_to_gloss(frames_base64)).await?;
        let gloss = normalize_gloss_shape(cv_output);
        let nlp = stage(request_id, "gloss_to_text", self.gloss_to_text.gloss_to_text(&gloss)).await?;
        Ok((request_id, extract_text(nlp)?))
    }

    /// Synthesizes speech for already-finalized text. Used by the
    /// streaming session at finalization rather than per-batch, so it is
    /// exposed directly rather than folded into one of the four pipelines.
    #[instrument(skip(self, text))]
    pub async fn synthesize_voice(&self, text: &str) -> Result<Vec<u8>, PipelineError> {
        let text = Self::require_text(text)?;
        Ok(self.tts.text_to_speech(text).await?)
    }
}

/// Extracts free text from an adapter response, regardless of which tagged
/// variant it arrived as.
fn extract_text(output: NlpOutput) -> Result<String, PipelineError> {
    match output {
        NlpOutput::Text(t) if !t.trim().is_empty() => Ok(t),
        NlpOutput::Gloss(tokens) if !tokens.is_empty() => Ok(tokens.join(" ")),
        _ => Err(PipelineError::InvalidInput(
            "adapter returned no usable text".into(),
        )),
    }
}

/// Coerces a CV response into a gloss-token list: a bare string response is
/// treated as a single-element list, matching the orchestrator's
/// output-normalization rule.
fn normalize_gloss_shape(output: NlpOutput) -> Vec<String> {
    match output {
        NlpOutput::Gloss(tokens) => tokens,
        NlpOutput::Text(t) => vec![t],
    }
}

/// Extracts a gloss-token sequence, filtering through the closed
/// vocabulary the same way free-form NLP output is filtered in the
/// original: unknown or stray tokens are dropped rather than failing the
/// whole pipeline, as long as at least one token resolves.
fn extract_gloss(output: NlpOutput) -> Result<Vec<String>, PipelineError> {
    let candidate_text = match output {
        NlpOutput::Gloss(tokens) => tokens.join(" "),
        NlpOutput::Text(t) => t,
    };
    let resolved = gloss::resolve_tokens(&candidate_text)?;
    Ok(resolved.into_iter().map(str::to_string).collect())
}
