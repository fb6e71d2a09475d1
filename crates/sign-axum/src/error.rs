//! Error taxonomy for the WebSocket session, mapped to close codes, and a
//! small `HttpError` for any plain HTTP surface (health check, batch
//! pipelines). Mirrors the teacher's `HttpError` + `From<CoreError>`
//! boundary-mapping pattern, scoped to this domain's error sources.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use sign_core::error::CoreError;
use sign_core::ports::ai::AiError;
use sign_core::ports::translation_repo::RepositoryError;
use sign_core::ports::video::VideoError;
use sign_core::ports::wallet::WalletError;
use sign_core::services::PipelineError;

/// Errors that can end (or be reported within) a streaming session.
/// Variant naming follows spec's taxonomy exactly; only the first five
/// terminate the connection (`close_code` returns `Some`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unauthenticated")]
    Auth,

    #[error("session request quota exceeded")]
    Quota,

    #[error("message rate exceeded")]
    Rate,

    #[error("heartbeat timeout")]
    LivenessHeartbeat,

    #[error("connection lifetime exceeded")]
    LivenessLifetime,

    #[error("insufficient credits")]
    InsufficientCredits,

    #[error("pipeline timed out")]
    PipelineTimeout,

    #[error("pipeline failed: {0}")]
    PipelineFailure(String),

    #[error("invalid state transition")]
    StateTransition,

    #[error("fatal session error: {0}")]
    Fatal(String),
}

impl SessionError {
    /// The WebSocket close code this error terminates the connection with,
    /// or `None` if it is reported as a message and the session continues.
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        match self {
            SessionError::Auth => Some(4001),
            SessionError::Rate => Some(4008),
            SessionError::LivenessLifetime => Some(4009),
            SessionError::LivenessHeartbeat => Some(4010),
            SessionError::Quota => Some(4011),
            SessionError::Fatal(_) => Some(1011),
            SessionError::InsufficientCredits
            | SessionError::PipelineTimeout
            | SessionError::PipelineFailure(_)
            | SessionError::StateTransition => None,
        }
    }
}

impl From<PipelineError> for SessionError {
    fn from(err: PipelineError) -> Self {
        SessionError::PipelineFailure(err.to_string())
    }
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Domain(_) => SessionError::InsufficientCredits,
            other => SessionError::Fatal(other.to_string()),
        }
    }
}

impl From<RepositoryError> for SessionError {
    fn from(err: RepositoryError) -> Self {
        SessionError::Fatal(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            HttpError::NotFound => StatusCode::NOT_FOUND,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            HttpError::Core(CoreError::Ai(AiError::AuthRequired { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            HttpError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<PipelineError> for HttpError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(message) => HttpError::BadRequest(message),
            other => HttpError::Core(CoreError::Validation(other.to_string())),
        }
    }
}

impl From<VideoError> for HttpError {
    fn from(err: VideoError) -> Self {
        HttpError::Core(CoreError::Video(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_closes_with_4001() {
        assert_eq!(SessionError::Auth.close_code(), Some(4001));
    }

    #[test]
    fn pipeline_failure_does_not_close() {
        assert_eq!(
            SessionError::PipelineFailure("x".into()).close_code(),
            None
        );
    }

    #[test]
    fn insufficient_credits_does_not_close() {
        assert_eq!(SessionError::InsufficientCredits.close_code(), None);
    }
}
