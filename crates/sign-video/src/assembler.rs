//! Content-addressed sign-video assembly: gloss tokens resolve to clip
//! files, get concatenated by `ffmpeg`, and the rendered output is cached
//! under a hash of the token sequence so repeat requests for the same
//! sentence never re-encode.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use sign_core::gloss::clip_for_token;
use sign_core::ports::video::{VideoAssemblerPort, VideoError};

use crate::config::VideoConfig;

pub struct SignVideoAssembler {
    config: VideoConfig,
}

impl SignVideoAssembler {
    #[must_use]
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    fn resolve_clips(&self, tokens: &[String]) -> Result<Vec<PathBuf>, VideoError> {
        if tokens.is_empty() {
            return Err(VideoError::Empty);
        }
        tokens
            .iter()
            .map(|token| {
                clip_for_token(token)
                    .map(|clip| self.config.clips_dir.join(clip))
                    .ok_or_else(|| VideoError::UnknownToken(token.clone()))
            })
            .collect()
    }

    /// Truncated SHA-256 of the joined token sequence. Stronger than a full
    /// MD5 digest while still short enough for a filesystem-friendly name.
    fn content_hash(tokens: &[String]) -> String {
        let joined = tokens.join("_");
        let digest = Sha256::digest(joined.as_bytes());
        hex_prefix(&digest, 32)
    }

    async fn write_concat_manifest(&self, clips: &[PathBuf]) -> Result<PathBuf, VideoError> {
        let manifest_path = self.config.output_dir.join(format!(
            "concat-{}.txt",
            uuid_like_suffix()
        ));
        let mut contents = String::new();
        for clip in clips {
            contents.push_str(&format!("file '{}'\n", clip.display()));
        }
        let mut file = tokio::fs::File::create(&manifest_path)
            .await
            .map_err(|e| VideoError::Io(e.to_string()))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| VideoError::Io(e.to_string()))?;
        Ok(manifest_path)
    }

    async fn encode(&self, manifest_path: &Path, output_path: &Path) -> Result<(), VideoError> {
        let status = Command::new("ffmpeg")
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest_path)
            .args(["-vf", "scale=720:1280,fps=30"])
            .args(["-c:v", "libx264"])
            .args(["-pix_fmt", "yuv420p"])
            .args(["-movflags", "+faststart"])
            .arg(output_path)
            .status()
            .await
            .map_err(|e| VideoError::Encoding(format!("failed to spawn ffmpeg: {e}")))?;

        if !status.success() {
            return Err(VideoError::Encoding(format!(
                "ffmpeg exited with status {status}"
            )));
        }
        Ok(())
    }

    fn cdn_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.config.cdn_base_url.trim_end_matches('/'), file_name)
    }
}

#[async_trait]
impl VideoAssemblerPort for SignVideoAssembler {
    async fn assemble(&self, tokens: &[String]) -> Result<String, VideoError> {
        let clips = self.resolve_clips(tokens)?;
        let hash = Self::content_hash(tokens);
        let file_name = format!("{hash}.mp4");
        let output_path = self.config.output_dir.join(&file_name);

        if tokio::fs::metadata(&output_path).await.is_ok() {
            debug!(hash, "clip cache hit, skipping ffmpeg encode");
            return Ok(self.cdn_url(&file_name));
        }

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| VideoError::Io(e.to_string()))?;

        let manifest_path = self.write_concat_manifest(&clips).await?;
        let encode_result = self.encode(&manifest_path, &output_path).await;
        let _ = tokio::fs::remove_file(&manifest_path).await;
        encode_result?;
        debug!(hash, clip_count = clips.len(), "ffmpeg encode complete");

        Ok(self.cdn_url(&file_name))
    }
}

fn hex_prefix(digest: &[u8], chars: usize) -> String {
    let mut s = String::with_capacity(chars);
    for byte in digest {
        if s.len() >= chars {
            break;
        }
        s.push_str(&format!("{byte:02x}"));
    }
    s.truncate(chars);
    s
}

/// A short collision-resistant-enough suffix for the scratch manifest file;
/// concurrent renders of the same sentence must not clobber each other's
/// manifest before the cache-hit check runs.
fn uuid_like_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_for_same_tokens() {
        let tokens = vec!["حريق".to_string(), "خطر".to_string()];
        assert_eq!(
            SignVideoAssembler::content_hash(&tokens),
            SignVideoAssembler::content_hash(&tokens)
        );
    }

    #[test]
    fn content_hash_differs_for_different_order() {
        let a = vec!["حريق".to_string(), "خطر".to_string()];
        let b = vec!["خطر".to_string(), "حريق".to_string()];
        assert_ne!(
            SignVideoAssembler::content_hash(&a),
            SignVideoAssembler::content_hash(&b)
        );
    }

    #[tokio::test]
    async fn resolve_clips_rejects_unknown_token() {
        let assembler = SignVideoAssembler::new(VideoConfig::new());
        let result = assembler.resolve_clips(&["نصنا".to_string()]);
        assert!(matches!(result, Err(VideoError::UnknownToken(_))));
    }

    #[tokio::test]
    async fn resolve_clips_rejects_empty_input() {
        let assembler = SignVideoAssembler::new(VideoConfig::new());
        assert!(matches!(assembler.resolve_clips(&[]), Err(VideoError::Empty)));
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_without_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let config = VideoConfig::new().with_output_dir(dir.path());
        let assembler = SignVideoAssembler::new(config);

        let tokens = vec!["حريق".to_string()];
        let hash = SignVideoAssembler::content_hash(&tokens);
        let cached_path = dir.path().join(format!("{hash}.mp4"));
        tokio::fs::write(&cached_path, b"fake mp4 bytes").await.unwrap();

        let url = assembler.assemble(&tokens).await.unwrap();
        assert!(url.ends_with(&format!("{hash}.mp4")));
    }
}
