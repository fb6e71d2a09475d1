//! Port for the sign-video assembler (C6): gloss tokens in, a rendered
//! (or cache-hit) MP4 URL out.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("unknown gloss token: {0}")]
    UnknownToken(String),

    #[error("no gloss tokens to render")]
    Empty,

    #[error("ffmpeg invocation failed: {0}")]
    Encoding(String),

    #[error("io error: {0}")]
    Io(String),
}

#[async_trait]
pub trait VideoAssemblerPort: Send + Sync {
    /// Resolves `tokens` to clips, concatenates them, and returns a URL to
    /// the rendered video. Content-addressed: identical token sequences
    /// resolve to the same cached output without re-encoding.
    async fn assemble(&self, tokens: &[String]) -> Result<String, VideoError>;
}
