//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mathscribe_core::calculator::gemini::{GeminiClient, DEFAULT_GEMINI_URL, DEFAULT_MODEL};

pub mod analyze;
pub mod serve;

/// Mathscribe - handwritten math recognition service
#[derive(Parser)]
#[command(name = "mathscribe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Deployment environment; controls default log verbosity
    #[arg(long, env = "ENV", value_enum, default_value = "production", global = true)]
    pub env: RunEnv,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(serve::ServeArgs),

    /// Recognise the expression in a local image file
    Analyze(analyze::AnalyzeArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunEnv {
    Dev,
    Production,
}

/// Options for reaching the generative model.
#[derive(Args)]
pub struct ModelArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Gemini model to use
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_URL", default_value = DEFAULT_GEMINI_URL)]
    pub api_url: String,
}

impl ModelArgs {
    pub fn client(&self) -> Result<GeminiClient> {
        Ok(GeminiClient::with_base_url(&self.api_key, &self.model, &self.api_url)?)
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Analyze(args) => analyze::execute(args).await,
        }
    }
}
