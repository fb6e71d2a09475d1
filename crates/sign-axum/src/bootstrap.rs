//! Composition root. The only place concrete adapters are instantiated and
//! wired behind their port trait objects.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use sign_ai::{AiConfig, ComputerVisionClient, GlossToTextClient, SpeechToTextClient, TextToGlossClient, TextToSpeechClient};
use sign_core::ports::ai::{CvPort, GlossToTextPort, SttPort, TextToGlossPort, TtsPort};
use sign_core::ports::video::VideoAssemblerPort;
use sign_core::services::PipelineOrchestrator;
use sign_core::settings::Config;
use sign_db::{setup_database, RepoFactory};
use sign_video::{SignVideoAssembler, VideoConfig};

use crate::state::AxumContext;

/// Server-level configuration: where the process binds, where the SQLite
/// database lives, and the secret used to validate incoming bearer tokens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Reads the bind address, database path and JWT secret from the
    /// environment, falling back to development defaults for the first two.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET must be set to validate session tokens")?;
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            db_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "sign-translate.db".to_string())
                .into(),
            jwt_secret,
        })
    }
}

/// Wires every adapter behind its port and assembles the shared context
/// handed to every Axum handler.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let pipeline_config = Config::from_env();

    let pool = setup_database(&config.db_path).await?;
    let repos = RepoFactory::build(pool);

    let ai_config = AiConfig::from_env();
    let cv: Arc<dyn CvPort> = Arc::new(ComputerVisionClient::new(&ai_config));
    let text_to_gloss: Arc<dyn TextToGlossPort> = Arc::new(TextToGlossClient::new(&ai_config));
    let gloss_to_text: Arc<dyn GlossToTextPort> = Arc::new(GlossToTextClient::new(&ai_config));
    let stt: Arc<dyn SttPort> = Arc::new(SpeechToTextClient::new(&ai_config));
    let tts: Arc<dyn TtsPort> = Arc::new(TextToSpeechClient::new(&ai_config));

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        cv,
        text_to_gloss,
        gloss_to_text,
        stt,
        tts,
    ));

    let video: Arc<dyn VideoAssemblerPort> =
        Arc::new(SignVideoAssembler::new(VideoConfig::from_env()));

    Ok(AxumContext {
        config: pipeline_config,
        repos,
        orchestrator,
        video,
        jwt_secret: config.jwt_secret.clone(),
    })
}

/// Bootstraps the context and serves the router until the process is
/// terminated.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "sign-translate server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
