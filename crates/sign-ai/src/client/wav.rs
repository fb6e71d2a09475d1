//! Converts an arbitrary audio upload to mono 16kHz PCM16 WAV via `ffmpeg`,
//! the format the speech-to-text backend requires. Grounded in the
//! original's `ensure_wav` utility, which shells out to `ffmpeg` the same
//! way.

use tokio::process::Command;

use crate::error::AiError;

pub(super) async fn ensure_wav(audio_bytes: &[u8]) -> Result<Vec<u8>, AiError> {
    let input = tempfile::Builder::new()
        .suffix(".input")
        .tempfile()
        .map_err(|e| AiError::InvalidResponse {
            message: format!("failed to create temp input file: {e}"),
        })?;
    tokio::fs::write(input.path(), audio_bytes)
        .await
        .map_err(|e| AiError::InvalidResponse {
            message: format!("failed to write temp input file: {e}"),
        })?;

    let output = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile()
        .map_err(|e| AiError::InvalidResponse {
            message: format!("failed to create temp output file: {e}"),
        })?;

    let status = Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
        ])
        .arg(input.path())
        .args(["-ac", "1", "-ar", "16000", "-sample_fmt", "s16"])
        .arg(output.path())
        .status()
        .await
        .map_err(|e| AiError::InvalidResponse {
            message: format!("failed to spawn ffmpeg: {e}"),
        })?;

    if !status.success() {
        return Err(AiError::InvalidResponse {
            message: format!("ffmpeg exited with status {status}"),
        });
    }

    tokio::fs::read(output.path())
        .await
        .map_err(|e| AiError::InvalidResponse {
            message: format!("failed to read converted wav: {e}"),
        })
}
