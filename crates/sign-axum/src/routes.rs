//! Route definitions and router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::{AppState, AxumContext};

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the complete router: the streaming WebSocket endpoint plus a
/// plain health check, with a permissive CORS layer over the API surface.
pub fn create_router(ctx: AxumContext) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer();

    Router::new()
        .route("/health", get(health_check))
        .route("/ws/translation/stream/", get(handlers::translation_stream))
        .route("/api/translate/text-to-sign", post(handlers::batch::text_to_sign))
        .route("/api/translate/voice-to-sign", post(handlers::batch::voice_to_sign))
        .route("/api/translate/sign-to-text", post(handlers::batch::sign_to_text))
        .route("/api/translate/sign-to-voice", post(handlers::batch::sign_to_voice))
        .with_state(state)
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
