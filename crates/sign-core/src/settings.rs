//! Runtime configuration, loaded once from the environment at startup.
//!
//! Mirrors the builder-pattern configuration structs used throughout the
//! adapter crates (`AiConfig`, `ServerConfig`): a `Default` that matches the
//! documented defaults, plus `with_*` overrides for tests.

use std::time::Duration;

/// Tunables for the streaming translation pipeline (spec §6.2).
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum seconds between batch dispatches.
    pub send_interval: Duration,
    /// Frame deque capacity.
    pub max_buffer_size: usize,
    /// Frames per dispatch (tail slice).
    pub max_batch_frames: usize,
    /// Hard upper bound on frames per dispatch.
    pub max_frames_per_request: usize,
    /// `start` invocations allowed per connection.
    pub max_requests_per_session: u32,
    /// Per-batch orchestrator deadline.
    pub pipeline_timeout: Duration,
    /// Ping gap tolerated before closing.
    pub heartbeat_timeout: Duration,
    /// Per-connection message rate cap (messages/second).
    pub ws_max_messages_per_second: usize,
    /// Absolute connection lifetime.
    pub ws_max_connection_time: Duration,
    /// Per AI-adapter-call deadline.
    pub ai_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_secs(5),
            max_buffer_size: 120,
            max_batch_frames: 30,
            max_frames_per_request: 64,
            max_requests_per_session: 5,
            pipeline_timeout: Duration::from_secs(15),
            heartbeat_timeout: Duration::from_secs(30),
            ws_max_messages_per_second: 30,
            ws_max_connection_time: Duration::from_secs(900),
            ai_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to the
    /// documented defaults for any variable that is unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            send_interval: env_secs("SEND_INTERVAL", defaults.send_interval),
            max_buffer_size: env_usize("MAX_BUFFER_SIZE", defaults.max_buffer_size),
            max_batch_frames: env_usize("MAX_BATCH_FRAMES", defaults.max_batch_frames),
            max_frames_per_request: env_usize(
                "MAX_FRAMES_PER_REQUEST",
                defaults.max_frames_per_request,
            ),
            max_requests_per_session: env_u32(
                "MAX_REQUESTS_PER_SESSION",
                defaults.max_requests_per_session,
            ),
            pipeline_timeout: env_secs("PIPELINE_TIMEOUT_SECONDS", defaults.pipeline_timeout),
            heartbeat_timeout: env_secs("HEARTBEAT_TIMEOUT", defaults.heartbeat_timeout),
            ws_max_messages_per_second: env_usize(
                "WS_MAX_MESSAGES_PER_SECOND",
                defaults.ws_max_messages_per_second,
            ),
            ws_max_connection_time: env_secs(
                "WS_MAX_CONNECTION_TIME",
                defaults.ws_max_connection_time,
            ),
            ai_timeout: env_secs("AI_TIMEOUT", defaults.ai_timeout),
        }
    }
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
