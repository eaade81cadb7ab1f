//! Mathscribe CLI
//!
//! Serves the handwritten math recognition API, or runs the recognition
//! pipeline once against a local image.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands, RunEnv};

/// Initialize tracing with optional file logging.
fn init_tracing(log_file: Option<&std::path::Path>, env: RunEnv) -> Result<()> {
    let default_filter = match env {
        RunEnv::Dev => "mathscribe=debug,mathscribe_core=debug,mathscribe_web=debug,tower_http=debug",
        RunEnv::Production => "mathscribe=info,mathscribe_core=info,mathscribe_web=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        // Log to both stdout and file when --log is used
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so .env values act as flag fallbacks.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) => args.log.clone(),
        _ => None,
    };
    init_tracing(log_file.as_deref(), cli.env)?;

    cli.execute().await
}
