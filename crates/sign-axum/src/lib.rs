#![deny(unsafe_code)]

//! Axum WebSocket transport, batch REST pipelines, session controller, and
//! the composition root for the sign-translation backend.

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod ws_frames;

pub use bootstrap::{bootstrap, start_server, ServerConfig};
pub use state::{AppState, AxumContext};
