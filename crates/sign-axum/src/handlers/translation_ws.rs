//! WebSocket upgrade handler for the streaming sign-translation session.
//!
//! `GET /ws/translation/stream/` upgrades to a WebSocket carrying binary
//! sign-video frames inbound and JSON control/result messages both ways.
//! Structured like `voice_ws.rs`: split the socket, one task ingests, the
//! session controller's batch loop is the egress driver, `tokio::select!`
//! tears both down on whichever finishes first.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use sign_core::domain::translation::Direction;

use crate::auth;
use crate::error::SessionError;
use crate::session::{OutputMode, ServerMessage, SessionController};
use crate::state::AppState;
use crate::ws_frames::RateWindow;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    token: Option<String>,
}

pub async fn translation_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    let header_value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = auth::extract_token(header_value, query.token.as_deref());

    let user_id = match token.and_then(|t| auth::authenticate(t, &state.jwt_secret).ok()) {
        Some(id) => id,
        None => {
            return ws.on_upgrade(|socket| async move {
                close_immediately(socket, SessionError::Auth).await;
            });
        }
    };

    ws.on_upgrade(move |socket| handle_session(socket, state, user_id))
}

async fn close_immediately(mut socket: WebSocket, err: SessionError) {
    if let Some(code) = err.close_code() {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code,
                reason: err.to_string().into(),
            })))
            .await;
    }
}

async fn handle_session(socket: WebSocket, state: AppState, user_id: i64) {
    info!(user_id, "translation stream opened");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let controller = SessionController::new(
        user_id,
        state.config.clone(),
        state.orchestrator.clone(),
        state.repos.wallet.clone(),
        state.repos.translations.clone(),
        outbound_tx,
    );

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let batch_controller = controller.clone();
    let mut batch_loop = tokio::spawn(async move { batch_controller.run_batch_loop().await });

    let mut egress = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let ingest_controller = controller.clone();
    let mut rate_window = RateWindow::new(state.config.ws_max_messages_per_second);
    let mut ingest = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            let message = match msg_result {
                Ok(m) => m,
                Err(_) => return None,
            };
            match message {
                Message::Binary(data) => {
                    if rate_window.record(Instant::now()) {
                        return Some(SessionError::Rate);
                    }
                    ingest_controller.on_frame(data.to_vec()).await;
                }
                Message::Text(text) => {
                    if rate_window.record(Instant::now()) {
                        return Some(SessionError::Rate);
                    }
                    if let Some(err) = dispatch_control(&ingest_controller, &text).await {
                        return Some(err);
                    }
                }
                Message::Close(_) => return None,
                _ => {}
            }
        }
        None
    });

    let close_reason = tokio::select! {
        result = &mut ingest => {
            batch_loop.abort();
            egress.abort();
            result.ok().flatten()
        }
        reason = &mut batch_loop => {
            ingest.abort();
            egress.abort();
            reason.ok()
        }
    };

    let _ = controller.stop_translation().await;
    controller.close().await;

    info!(user_id, ?close_reason, "translation stream closed");
}

/// Parses and applies one text control frame. Returns `Some` only for
/// terminal session errors; anything else is reported inline and the
/// session continues.
async fn dispatch_control(controller: &Arc<SessionController>, text: &str) -> Option<SessionError> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            controller.send(ServerMessage::Error {
                message: "Invalid JSON".into(),
            });
            return None;
        }
    };
    let action = value
        .get("action")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("");

    match action {
        "ping" => {
            controller.on_ping().await;
            None
        }
        "start" => {
            let output_mode = value
                .get("output_type")
                .and_then(Value::as_str)
                .and_then(OutputMode::parse)
                .unwrap_or(OutputMode::Text);
            match controller.start_translation(Direction::FromSign, output_mode).await {
                Ok(()) => None,
                Err(err) => {
                    if err.close_code().is_some() {
                        Some(err)
                    } else {
                        warn!(error = %err, "start_translation rejected");
                        if matches!(err, SessionError::InsufficientCredits) {
                            controller.send(ServerMessage::Error {
                                message: "Not enough credits".into(),
                            });
                        }
                        None
                    }
                }
            }
        }
        "stop" => match controller.stop_translation().await {
            Ok(()) => None,
            Err(err) => {
                if err.close_code().is_some() {
                    Some(err)
                } else {
                    warn!(error = %err, "stop_translation failed");
                    None
                }
            }
        },
        _ => {
            controller.send(ServerMessage::Error {
                message: "Unknown action".into(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use sign_core::domain::wallet::{CreditTransaction, Wallet, WalletError as DomainWalletError};
    use sign_core::domain::translation::TranslationRecord;
    use sign_core::ports::ai::{AiError, CvPort, GlossToTextPort, NlpOutput, SttPort, TextToGlossPort, TtsPort};
    use sign_core::ports::translation_repo::{RepositoryError, TranslationRepository};
    use sign_core::ports::wallet::{WalletError as PortWalletError, WalletPort};
    use sign_core::services::PipelineOrchestrator;
    use sign_core::settings::Config;

    use super::*;

    struct FakeWallet {
        allow: bool,
    }

    #[async_trait]
    impl WalletPort for FakeWallet {
        async fn get_or_provision(&self, user_id: i64) -> Result<Wallet, PortWalletError> {
            Ok(Wallet {
                id: 1,
                user_id,
                plan_credits_per_month: 30,
                credits_used: 0,
                bonus_credits: 0,
                last_reset: Utc::now(),
            })
        }

        async fn consume(&self, user_id: i64, amount: i64, _reason: &str) -> Result<Wallet, PortWalletError> {
            if self.allow {
                Ok(Wallet {
                    id: 1,
                    user_id,
                    plan_credits_per_month: 30,
                    credits_used: amount,
                    bonus_credits: 0,
                    last_reset: Utc::now(),
                })
            } else {
                Err(PortWalletError::Domain(DomainWalletError::InsufficientCredits {
                    requested: amount,
                    remaining: 0,
                }))
            }
        }

        async fn reward(&self, _user_id: i64, _amount: i64, _reason: &str) -> Result<Wallet, PortWalletError> {
            unreachable!("not exercised by these tests")
        }

        async fn list_transactions(
            &self,
            _user_id: i64,
            _limit: i64,
        ) -> Result<Vec<CreditTransaction>, PortWalletError> {
            unreachable!("not exercised by these tests")
        }
    }

    struct FakeTranslations;

    #[async_trait]
    impl TranslationRepository for FakeTranslations {
        async fn create(&self, mut record: TranslationRecord) -> Result<TranslationRecord, RepositoryError> {
            record.id = 1;
            Ok(record)
        }

        async fn update_result(
            &self,
            _id: i64,
            _status: sign_core::domain::translation::TranslationStatus,
            _result_text: Option<String>,
            _result_gloss: Option<Vec<String>>,
            _result_audio_base64: Option<String>,
            _result_video_url: Option<String>,
        ) -> Result<TranslationRecord, RepositoryError> {
            unreachable!("not exercised by these tests")
        }

        async fn get(&self, _id: i64) -> Result<TranslationRecord, RepositoryError> {
            unreachable!("not exercised by these tests")
        }

        async fn list_for_user(
            &self,
            _user_id: i64,
            _limit: i64,
        ) -> Result<Vec<TranslationRecord>, RepositoryError> {
            unreachable!("not exercised by these tests")
        }
    }

    struct UnusedCv;
    #[async_trait]
    impl CvPort for UnusedCv {
        async fn sign_to_gloss(&self, _frames: &[String]) -> Result<NlpOutput, AiError> {
            unreachable!("not exercised by these tests")
        }
    }
    struct UnusedTextToGloss;
    #[async_trait]
    impl TextToGlossPort for UnusedTextToGloss {
        async fn text_to_gloss(&self, _text: &str) -> Result<NlpOutput, AiError> {
            unreachable!("not exercised by these tests")
        }
    }
    struct UnusedGlossToText;
    #[async_trait]
    impl GlossToTextPort for UnusedGlossToText {
        async fn gloss_to_text(&self, _gloss: &[String]) -> Result<NlpOutput, AiError> {
            unreachable!("not exercised by these tests")
        }
    }
    struct UnusedStt;
    #[async_trait]
    impl SttPort for UnusedStt {
        async fn speech_to_text(&self, _audio: &[u8]) -> Result<NlpOutput, AiError> {
            unreachable!("not exercised by these tests")
        }
    }
    struct UnusedTts;
    #[async_trait]
    impl TtsPort for UnusedTts {
        async fn text_to_speech(&self, _text: &str) -> Result<Vec<u8>, AiError> {
            unreachable!("not exercised by these tests")
        }
    }

    fn test_controller(allow_credits: bool) -> (Arc<SessionController>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: allow_credits });
        let translations: Arc<dyn TranslationRepository> = Arc::new(FakeTranslations);
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            Arc::new(UnusedCv),
            Arc::new(UnusedTextToGloss),
            Arc::new(UnusedGlossToText),
            Arc::new(UnusedStt),
            Arc::new(UnusedTts),
        ));
        let controller = SessionController::new(1, Config::default(), orchestrator, wallet, translations, outbound_tx);
        (controller, outbound_rx)
    }

    #[tokio::test]
    async fn invalid_json_is_reported_and_session_continues() {
        let (controller, mut rx) = test_controller(true);

        let result = dispatch_control(&controller, "not json").await;

        assert!(result.is_none());
        let message = rx.recv().await.unwrap();
        assert!(matches!(message, ServerMessage::Error { message } if message == "Invalid JSON"));
    }

    #[tokio::test]
    async fn unknown_action_is_reported_and_session_continues() {
        let (controller, mut rx) = test_controller(true);

        let result = dispatch_control(&controller, r#"{"action":"dance"}"#).await;

        assert!(result.is_none());
        let message = rx.recv().await.unwrap();
        assert!(matches!(message, ServerMessage::Error { message } if message == "Unknown action"));
    }

    #[tokio::test]
    async fn start_without_enough_credits_is_reported_and_session_stays_idle() {
        let (controller, mut rx) = test_controller(false);

        let result = dispatch_control(&controller, r#"{"action":"start"}"#).await;

        assert!(result.is_none());
        let message = rx.recv().await.unwrap();
        assert!(matches!(message, ServerMessage::Error { message } if message == "Not enough credits"));
    }

    #[tokio::test]
    async fn ping_replies_with_pong() {
        let (controller, mut rx) = test_controller(true);

        let result = dispatch_control(&controller, r#"{"action":"ping"}"#).await;

        assert!(result.is_none());
        let message = rx.recv().await.unwrap();
        assert!(matches!(message, ServerMessage::Pong));
    }
}
