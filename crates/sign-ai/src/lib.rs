#![deny(unsafe_code)]

//! HTTP client adapters for the five external AI models the translation
//! pipelines depend on: computer vision, text-to-gloss, gloss-to-text,
//! speech-to-text, and text-to-speech.

mod client;
mod config;
mod error;

pub use client::{
    ComputerVisionClient, GlossToTextClient, SpeechToTextClient, TextToGlossClient,
    TextToSpeechClient,
};
pub use config::AiConfig;
pub use error::AiError;
