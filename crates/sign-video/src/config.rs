//! Filesystem and CDN configuration for the sign-video assembler.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct VideoConfig {
    /// Directory containing the source clip files named in the gloss map.
    pub(crate) clips_dir: PathBuf,
    /// Directory rendered/cached outputs are written to.
    pub(crate) output_dir: PathBuf,
    /// Public base URL the rendered file is served from, e.g. a CDN origin.
    pub(crate) cdn_base_url: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            clips_dir: PathBuf::from("clips"),
            output_dir: PathBuf::from("generated"),
            cdn_base_url: "https://cdn.example.com/sign-videos".to_string(),
        }
    }
}

impl VideoConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clips_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.clips_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_base_url = url.into();
        self
    }

    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("SIGN_CLIPS_DIR") {
            config.clips_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SIGN_VIDEO_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SIGN_VIDEO_CDN_BASE_URL") {
            config.cdn_base_url = v;
        }
        config
    }
}
