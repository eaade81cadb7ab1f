//! Web server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mathscribe_web::{ServerConfig, DEFAULT_ALLOWED_ORIGIN, DEFAULT_MAX_BODY_BYTES};

use super::ModelArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "SERVER_URL", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Browser origins allowed to call the API (repeat or comma separate)
    #[arg(
        long = "allowed-origin",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_ALLOWED_ORIGIN
    )]
    pub allowed_origins: Vec<String>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Also write logs to this file
    #[arg(long)]
    pub log: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let client = args.model.client()?;

    println!();
    println!("  {} {}", "Mathscribe".cyan().bold(), "API Server".bold());
    println!();
    println!("  {}       http://{}:{}", "API".green(), args.host, args.port);
    println!("  {}     {}", "Model".green(), client.model());
    println!("  {}   {}", "Origins".green(), args.allowed_origins.join(", "));
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        allowed_origins: args.allowed_origins,
        max_body_bytes: args.max_body_bytes,
    };
    mathscribe_web::run_server(Arc::new(client), config).await?;

    Ok(())
}
