//! Shared plumbing for the five adapter clients: HTTP client construction
//! and internal-to-port error mapping.

use std::time::Duration;

use tracing::warn;

use sign_core::ports::ai::AiError as PortAiError;

use crate::error::AiError;

pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Maps an internal [`AiError`] to the port-level error the orchestrator
/// sees, tagging it with which adapter produced it (mirrors `gglib-hf`'s
/// `map_error` in `port.rs`, minus the HF-specific model/quantization
/// variants this domain has no use for). 5xx is an undifferentiated
/// upstream failure; 4xx carries the response body excerpt back so the
/// caller can see why the request was rejected rather than just that it
/// was.
pub(crate) fn map_error(adapter: &'static str, err: AiError) -> PortAiError {
    match err {
        AiError::RequestFailed { status, body, .. } => match status {
            401 | 403 => PortAiError::AuthRequired { adapter },
            429 => PortAiError::RateLimited { adapter },
            s if s >= 500 => PortAiError::Request {
                adapter,
                message: format!("upstream server error {s}"),
            },
            s => PortAiError::Request {
                adapter,
                message: format!("upstream rejected request with {s}: {body}"),
            },
        },
        AiError::InvalidResponse { message } => PortAiError::Request { adapter, message },
        AiError::Network(e) if e.is_timeout() => PortAiError::Timeout { adapter },
        AiError::Network(e) => PortAiError::Request {
            adapter,
            message: e.to_string(),
        },
        AiError::InvalidUrl(e) => PortAiError::Request {
            adapter,
            message: e.to_string(),
        },
        AiError::Json(e) => PortAiError::Request {
            adapter,
            message: e.to_string(),
        },
    }
}

/// Reads and retains the response body on any non-2xx status: 5xx fails
/// the call outright, while 4xx keeps the body (truncated to a reasonable
/// excerpt) so the caller can inspect what the upstream rejected.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect();
    warn!(status, %url, "non-2xx response from adapter");
    Err(AiError::RequestFailed { status, url, body })
}
