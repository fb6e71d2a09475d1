mod common;
mod cv;
mod gloss_fields;
mod gloss_to_text;
mod stt;
mod text_to_gloss;
mod tts;
mod wav;

pub use cv::ComputerVisionClient;
pub use gloss_to_text::GlossToTextClient;
pub use stt::SpeechToTextClient;
pub use text_to_gloss::TextToGlossClient;
pub use tts::TextToSpeechClient;
