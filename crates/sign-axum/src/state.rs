//! Shared application state handed to every handler.

use std::sync::Arc;

use sign_core::services::PipelineOrchestrator;
use sign_core::settings::Config;
use sign_db::Repos;

pub struct AxumContext {
    pub config: Config,
    pub repos: Repos,
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub video: Arc<dyn sign_core::ports::video::VideoAssemblerPort>,
    pub jwt_secret: String,
}

pub type AppState = Arc<AxumContext>;
