//! CLI entry point — the composition root for the `sign-server` binary.
//!
//! Loads `.env`, parses CLI flags (falling back to environment variables),
//! initializes structured logging, then hands off to `sign_axum::bootstrap`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sign_axum::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "sign-server", about = "Real-time sign-language translation backend")]
struct Cli {
    /// Address to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// Path to the SQLite database file.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: Option<std::path::PathBuf>,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    sign_axum::start_server(config).await
}
