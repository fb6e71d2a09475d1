//! The per-connection session controller (C4): owns the state machine, the
//! bounded frame channel, the request counter, and the periodic batch loop.
//! Modeled on `voice_ws.rs`'s ingest/egress task split — the WebSocket read
//! loop feeds frames and control actions into this controller; a second
//! `tokio::spawn`ed task drains the frame channel on a fixed tick and drives
//! the orchestrator.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, warn};

use sign_core::domain::translation::{
    Direction, InputType, OutputType as DomainOutputType, ProcessingMode, TranslationRecord,
    TranslationStatus,
};
use sign_core::ports::translation_repo::TranslationRepository;
use sign_core::ports::wallet::WalletPort;
use sign_core::services::PipelineOrchestrator;
use sign_core::settings::Config;

use crate::error::SessionError;
use crate::session::state::{OutputMode, SessionState};

/// Every `start` action costs a single credit, per the wallet's
/// `consume`/`reward` unit of account.
const TRANSLATION_COST_CREDITS: i64 = 1;

/// Outbound messages, serialized to JSON text frames by the transport layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "status")]
    Status { state: &'static str, translation_id: Option<i64> },
    #[serde(rename = "partial_result")]
    PartialResult { text: String },
    #[serde(rename = "final_result")]
    FinalResult {
        text: String,
        audio_base64: Option<String>,
    },
    #[serde(rename = "warning")]
    Warning { message: String },
    #[serde(rename = "error")]
    Error { message: String },
}

struct Inner {
    state: SessionState,
    partial_text: Vec<String>,
}

/// Owns everything the WebSocket read loop and the batch loop need to share.
/// The read loop calls `on_frame`/`on_ping`/`start_translation`/
/// `stop_translation` directly; the batch loop only touches `inner` and the
/// frame receiver.
pub struct SessionController {
    user_id: i64,
    config: Config,
    inner: Mutex<Inner>,
    requests_made: AtomicU32,
    frame_tx: mpsc::Sender<Vec<u8>>,
    frame_rx: Mutex<mpsc::Receiver<Vec<u8>>>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
    orchestrator: Arc<PipelineOrchestrator>,
    wallet: Arc<dyn WalletPort>,
    translations: Arc<dyn TranslationRepository>,
    connection_started_at: Instant,
    last_heartbeat: Mutex<Instant>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        user_id: i64,
        config: Config,
        orchestrator: Arc<PipelineOrchestrator>,
        wallet: Arc<dyn WalletPort>,
        translations: Arc<dyn TranslationRepository>,
        outbound: mpsc::UnboundedSender<ServerMessage>,
    ) -> Arc<Self> {
        let (frame_tx, frame_rx) = mpsc::channel(config.max_buffer_size);
        let now = Instant::now();
        Arc::new(Self {
            user_id,
            config,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                partial_text: Vec::new(),
            }),
            requests_made: AtomicU32::new(0),
            frame_tx,
            frame_rx: Mutex::new(frame_rx),
            outbound,
            orchestrator,
            wallet,
            translations,
            connection_started_at: now,
            last_heartbeat: Mutex::new(now),
        })
    }

    pub(crate) fn send(&self, message: ServerMessage) {
        let _ = self.outbound.send(message);
    }

    /// Drains any frames queued on the channel without processing them.
    /// Called on every path out of `RUNNING` so a stale frame from the
    /// previous translation never becomes the next one's first batch.
    async fn drain_frames(&self) {
        let mut rx = self.frame_rx.lock().await;
        while rx.try_recv().is_ok() {}
    }

    /// Binary frame from the transport. Dropped silently when the session
    /// isn't `RUNNING`, and dropped with a debug log when the channel is at
    /// capacity — the bounded channel is the overflow guard described in
    /// the design notes, replacing a buffer-lock-and-deque.
    pub async fn on_frame(&self, frame: Vec<u8>) {
        let running = { self.inner.lock().await.state.is_running() };
        if !running {
            return;
        }
        if self.frame_tx.try_send(frame).is_err() {
            debug!(user_id = self.user_id, "frame buffer full, dropping newest frame");
        }
    }

    pub async fn on_ping(&self) {
        *self.last_heartbeat.lock().await = Instant::now();
        self.send(ServerMessage::Pong);
    }

    /// `start` action: quota check, credit check, record creation, state
    /// transition, in that order — matching spec.md's rejection ordering.
    pub async fn start_translation(
        &self,
        direction: Direction,
        output_mode: OutputMode,
    ) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        if guard.state.is_running() {
            return Ok(());
        }

        if self.requests_made.load(Ordering::SeqCst) >= self.config.max_requests_per_session {
            return Err(SessionError::Quota);
        }

        self.wallet
            .consume(self.user_id, TRANSLATION_COST_CREDITS, "streaming_translation")
            .await?;

        let output_type = match output_mode {
            OutputMode::Text => DomainOutputType::Text,
            OutputMode::Voice => DomainOutputType::Voice,
        };
        let record = TranslationRecord::new_processing(
            self.user_id,
            direction,
            InputType::Frames,
            output_type,
            ProcessingMode::Streaming,
        );
        let record = self.translations.create(record).await?;

        guard.state = guard.state.start(record.id, output_mode)?;
        guard.partial_text.clear();
        self.requests_made.fetch_add(1, Ordering::SeqCst);
        drop(guard);
        self.drain_frames().await;

        self.send(ServerMessage::Status {
            state: "running",
            translation_id: Some(record.id),
        });
        Ok(())
    }

    /// `stop` action (or a server-initiated finalize on close/timeout):
    /// transitions back to `IDLE`, joins buffered partial text into the
    /// final record, and synthesizes voice when the session's output mode
    /// calls for it.
    pub async fn stop_translation(&self) -> Result<(), SessionError> {
        let (translation_id, output_mode, joined_text) = {
            let mut guard = self.inner.lock().await;
            if !guard.state.is_running() {
                return Ok(());
            }
            let translation_id = guard.state.running_translation_id().expect("running");
            let output_mode = guard.state.running_output_mode().expect("running");
            let joined_text = guard.partial_text.join(" ").trim().to_string();
            guard.state = guard.state.stop()?;
            guard.partial_text.clear();
            (translation_id, output_mode, joined_text)
        };
        self.drain_frames().await;

        let audio_base64 = if matches!(output_mode, OutputMode::Voice) && !joined_text.is_empty() {
            match self.orchestrator.synthesize_voice(&joined_text).await {
                Ok(bytes) => Some(BASE64.encode(bytes)),
                Err(err) => {
                    self.send(ServerMessage::Warning {
                        message: format!("voice synthesis failed: {err}"),
                    });
                    None
                }
            }
        } else {
            None
        };

        self.translations
            .update_result(
                translation_id,
                TranslationStatus::Completed,
                Some(joined_text.clone()),
                None,
                audio_base64.clone(),
                None,
            )
            .await?;

        self.send(ServerMessage::FinalResult {
            text: joined_text,
            audio_base64,
        });
        self.send(ServerMessage::Status {
            state: "idle",
            translation_id: None,
        });
        Ok(())
    }

    /// Marks the session closed. Idempotent; does not itself finalize a
    /// `RUNNING` translation — callers finalize first if the close reason
    /// allows it (the transport always does, on graceful client-initiated
    /// close or forced timeouts alike).
    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        guard.state = guard.state.close();
    }

    fn lifetime_exceeded(&self) -> bool {
        self.connection_started_at.elapsed() > self.config.ws_max_connection_time
    }

    async fn heartbeat_exceeded(&self) -> bool {
        self.last_heartbeat.lock().await.elapsed() > self.config.heartbeat_timeout
    }

    /// Runs the periodic batch loop until it observes a liveness violation
    /// or the caller drops its handle. Intended to be the body of a
    /// dedicated `tokio::spawn`ed task, selected against the WebSocket
    /// read loop by the transport handler.
    pub async fn run_batch_loop(self: Arc<Self>) -> SessionError {
        let mut ticker = interval(std::time::Duration::from_millis(100));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_batch = Instant::now() - self.config.send_interval;

        loop {
            ticker.tick().await;

            if self.lifetime_exceeded() {
                return SessionError::LivenessLifetime;
            }
            if self.heartbeat_exceeded().await {
                return SessionError::LivenessHeartbeat;
            }

            let running = { self.inner.lock().await.state.is_running() };
            if !running {
                continue;
            }
            if last_batch.elapsed() < self.config.send_interval {
                continue;
            }

            let mut frames = Vec::new();
            {
                let mut frame_rx = self.frame_rx.lock().await;
                while let Ok(frame) = frame_rx.try_recv() {
                    frames.push(frame);
                }
            }
            if frames.is_empty() {
                continue;
            }
            last_batch = Instant::now();

            if frames.len() > self.config.max_batch_frames {
                let overflow = frames.len() - self.config.max_batch_frames;
                frames.drain(0..overflow);
            }
            if frames.len() > self.config.max_frames_per_request {
                self.send(ServerMessage::Error {
                    message: "Too many frames".into(),
                });
                continue;
            }

            self.dispatch_batch(frames).await;
        }
    }

    async fn dispatch_batch(&self, frames: Vec<Vec<u8>>) {
        let frames_base64: Vec<String> = frames.iter().map(|f| BASE64.encode(f)).collect();

        match timeout(
            self.config.pipeline_timeout,
            self.orchestrator.sign_to_text(&frames_base64),
        )
        .await
        {
            Ok(Ok(result)) => {
                if let Some(text) = result.text {
                    self.inner.lock().await.partial_text.push(text.clone());
                    self.send(ServerMessage::PartialResult { text });
                }
            }
            Ok(Err(err)) => {
                warn!(user_id = self.user_id, error = %err, "batch dispatch failed");
                self.send(ServerMessage::Error {
                    message: "AI service temporary error".into(),
                });
            }
            Err(_) => {
                self.send(ServerMessage::Warning {
                    message: "Poor connection, retrying...".into(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI64;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use sign_core::domain::wallet::{CreditTransaction, Wallet, WalletError as DomainWalletError};
    use sign_core::ports::ai::{AiError, CvPort, GlossToTextPort, NlpOutput, SttPort, TextToGlossPort, TtsPort};
    use sign_core::ports::translation_repo::RepositoryError;
    use sign_core::ports::wallet::WalletError as PortWalletError;

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

    struct FakeTranslations {
        next_id: AtomicI64,
    }

    impl FakeTranslations {
        fn new() -> Self {
            Self { next_id: AtomicI64::new(1) }
        }
    }

    #[async_trait]
    impl TranslationRepository for FakeTranslations {
        async fn create(&self, mut record: TranslationRecord) -> Result<TranslationRecord, RepositoryError> {
            record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(record)
        }

        async fn update_result(
            &self,
            id: i64,
            status: TranslationStatus,
            result_text: Option<String>,
            result_gloss: Option<Vec<String>>,
            result_audio_base64: Option<String>,
            result_video_url: Option<String>,
        ) -> Result<TranslationRecord, RepositoryError> {
            Ok(TranslationRecord {
                id,
                user_id: 1,
                direction: Direction::FromSign,
                input_type: InputType::Frames,
                output_type: DomainOutputType::Text,
                mode: ProcessingMode::Streaming,
                status,
                result_text,
                result_gloss,
                result_audio_base64,
                result_video_url,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
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

    struct FixedCv(NlpOutput);
    #[async_trait]
    impl CvPort for FixedCv {
        async fn sign_to_gloss(&self, _frames: &[String]) -> Result<NlpOutput, AiError> {
            Ok(self.0.clone())
        }
    }

    struct FailingCv;
    #[async_trait]
    impl CvPort for FailingCv {
        async fn sign_to_gloss(&self, _frames: &[String]) -> Result<NlpOutput, AiError> {
            Err(AiError::Timeout { adapter: "cv" })
        }
    }

    struct FixedGlossToText(NlpOutput);
    #[async_trait]
    impl GlossToTextPort for FixedGlossToText {
        async fn gloss_to_text(&self, _gloss: &[String]) -> Result<NlpOutput, AiError> {
            Ok(self.0.clone())
        }
    }

    struct SlowGlossToText(Duration);
    #[async_trait]
    impl GlossToTextPort for SlowGlossToText {
        async fn gloss_to_text(&self, _gloss: &[String]) -> Result<NlpOutput, AiError> {
            tokio::time::sleep(self.0).await;
            Ok(NlpOutput::Text("slow".into()))
        }
    }

    struct UnusedTextToGloss;
    #[async_trait]
    impl TextToGlossPort for UnusedTextToGloss {
        async fn text_to_gloss(&self, _text: &str) -> Result<NlpOutput, AiError> {
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

    fn orchestrator(cv: Arc<dyn CvPort>, gloss_to_text: Arc<dyn GlossToTextPort>) -> Arc<PipelineOrchestrator> {
        Arc::new(PipelineOrchestrator::new(
            cv,
            Arc::new(UnusedTextToGloss),
            gloss_to_text,
            Arc::new(UnusedStt),
            Arc::new(UnusedTts),
        ))
    }

    fn test_controller(
        wallet: Arc<dyn WalletPort>,
        config: Config,
        orchestrator: Arc<PipelineOrchestrator>,
    ) -> (Arc<SessionController>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let translations: Arc<dyn TranslationRepository> = Arc::new(FakeTranslations::new());
        let controller = SessionController::new(1, config, orchestrator, wallet, translations, outbound_tx);
        (controller, outbound_rx)
    }

    fn default_orchestrator() -> Arc<PipelineOrchestrator> {
        orchestrator(
            Arc::new(FixedCv(NlpOutput::Text("hello".into()))),
            Arc::new(FixedGlossToText(NlpOutput::Text("hello".into()))),
        )
    }

    #[tokio::test]
    async fn start_translation_rejects_insufficient_credits() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: false });
        let (controller, _rx) = test_controller(wallet, Config::default(), default_orchestrator());

        let err = controller
            .start_translation(Direction::FromSign, OutputMode::Text)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InsufficientCredits);
    }

    #[tokio::test]
    async fn start_translation_is_idempotent_while_running() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let (controller, _rx) = test_controller(wallet, Config::default(), default_orchestrator());

        controller.start_translation(Direction::FromSign, OutputMode::Text).await.unwrap();
        controller.start_translation(Direction::FromSign, OutputMode::Text).await.unwrap();
    }

    #[tokio::test]
    async fn start_translation_fails_once_quota_is_exhausted() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let mut config = Config::default();
        config.max_requests_per_session = 1;
        let (controller, _rx) = test_controller(wallet, config, default_orchestrator());

        controller.start_translation(Direction::FromSign, OutputMode::Text).await.unwrap();
        controller.stop_translation().await.unwrap();

        let err = controller
            .start_translation(Direction::FromSign, OutputMode::Text)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Quota);
    }

    #[tokio::test]
    async fn stop_translation_drains_frames_buffered_before_it() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let (controller, _rx) = test_controller(wallet, Config::default(), default_orchestrator());

        controller.start_translation(Direction::FromSign, OutputMode::Text).await.unwrap();
        controller.on_frame(vec![1, 2, 3]).await;
        controller.on_frame(vec![4, 5, 6]).await;
        controller.stop_translation().await.unwrap();

        let mut frame_rx = controller.frame_rx.lock().await;
        assert!(
            frame_rx.try_recv().is_err(),
            "frames buffered before stop must not leak into the next session"
        );
    }

    #[tokio::test]
    async fn dispatch_batch_reports_ai_service_temporary_error_on_pipeline_failure() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let orchestrator = orchestrator(Arc::new(FailingCv), Arc::new(FixedGlossToText(NlpOutput::Text("x".into()))));
        let (controller, mut rx) = test_controller(wallet, Config::default(), orchestrator);

        controller.dispatch_batch(vec![vec![1, 2, 3]]).await;

        let message = rx.recv().await.unwrap();
        assert!(matches!(
            message,
            ServerMessage::Error { message } if message == "AI service temporary error"
        ));
    }

    #[tokio::test]
    async fn dispatch_batch_reports_poor_connection_on_timeout() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let mut config = Config::default();
        config.pipeline_timeout = Duration::from_millis(5);
        let orchestrator = orchestrator(
            Arc::new(FixedCv(NlpOutput::Text("x".into()))),
            Arc::new(SlowGlossToText(Duration::from_millis(50))),
        );
        let (controller, mut rx) = test_controller(wallet, config, orchestrator);

        controller.dispatch_batch(vec![vec![1]]).await;

        let message = rx.recv().await.unwrap();
        assert!(matches!(
            message,
            ServerMessage::Warning { message } if message == "Poor connection, retrying..."
        ));
    }

    #[tokio::test]
    async fn run_batch_loop_reports_too_many_frames() {
        let wallet: Arc<dyn WalletPort> = Arc::new(FakeWallet { allow: true });
        let mut config = Config::default();
        config.send_interval = Duration::from_millis(1);
        config.max_batch_frames = 10;
        config.max_frames_per_request = 2;
        let (controller, mut rx) = test_controller(wallet, config, default_orchestrator());

        controller.start_translation(Direction::FromSign, OutputMode::Text).await.unwrap();
        for i in 0..5u8 {
            controller.on_frame(vec![i]).await;
        }

        let loop_controller = controller.clone();
        let handle = tokio::spawn(async move { loop_controller.run_batch_loop().await });

        let mut saw_too_many_frames = false;
        for _ in 0..5 {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                Ok(Some(ServerMessage::Error { message })) if message == "Too many frames" => {
                    saw_too_many_frames = true;
                    break;
                }
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        handle.abort();
        assert!(saw_too_many_frames, "expected a \"Too many frames\" error message");
    }
}
