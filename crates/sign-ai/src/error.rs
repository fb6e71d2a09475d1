//! Internal error type shared by all five HTTP clients.
//!
//! Mapped to the port-level `sign_core::ports::ai::AiError` at each client's
//! boundary (`map_error`), the way `gglib-hf` maps `HfError` to
//! `HfPortError` in its `port.rs`.

use thiserror::Error;

pub type AiResult<T> = Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request failed with status {status}: {url} (body: {body})")]
    RequestFailed {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
