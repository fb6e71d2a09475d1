pub mod orchestrator;

pub use orchestrator::{PipelineError, PipelineOrchestrator, PipelineResult};
