pub mod controller;
pub mod state;

pub use controller::{ServerMessage, SessionController};
pub use state::{OutputMode, SessionState};
