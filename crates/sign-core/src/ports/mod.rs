pub mod ai;
pub mod translation_repo;
pub mod video;
pub mod wallet;

pub use ai::{AiError, CvPort, GlossToTextPort, NlpOutput, SttPort, TextToGlossPort, TtsPort};
pub use translation_repo::{RepositoryError, TranslationRepository};
pub use video::{VideoAssemblerPort, VideoError};
pub use wallet::{WalletError, WalletPort};
