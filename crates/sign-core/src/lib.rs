#![deny(unsafe_code)]

//! Domain types, port traits and orchestration services for the
//! sign-language translation backend.
//!
//! This crate has no knowledge of SQLite, Axum or reqwest — it defines the
//! ports that adapter crates (`sign-db`, `sign-ai`, `sign-video`) implement,
//! and the services (`gloss` resolution, pipeline orchestration) that are
//! pure enough to unit test without any of those adapters.

pub mod domain;
pub mod error;
pub mod gloss;
pub mod ports;
pub mod services;
pub mod settings;

pub use error::CoreError;
pub use settings::Config;
