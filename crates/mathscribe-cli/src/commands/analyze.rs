//! One-shot recognition of a local image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use mathscribe_core::calculator::{self, model::ExpressionResult, model::Variables};
use serde_json::Value;

use super::ModelArgs;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Image file containing the handwritten expression
    pub path: PathBuf,

    /// Variable binding as NAME=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_binding)]
    pub vars: Vec<(String, Value)>,

    /// Print the raw JSON entries instead of a summary
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl AnalyzeArgs {
    pub fn variables(&self) -> Variables {
        self.vars.iter().cloned().collect()
    }
}

/// Parse `NAME=VALUE`; numeric values are kept as JSON numbers.
fn parse_binding(s: &str) -> Result<(String, Value), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }

    let value = value.trim();
    let value = match serde_json::from_str::<Value>(value) {
        Ok(n @ Value::Number(_)) => n,
        _ => Value::String(value.to_string()),
    };
    Ok((name.to_string(), value))
}

pub async fn execute(args: AnalyzeArgs) -> Result<()> {
    let client = args.model.client()?;

    let img = image::open(&args.path)
        .with_context(|| format!("Failed to open image {}", args.path.display()))?;

    if !args.json {
        println!("{} Analyzing image: {}", "→".dimmed(), args.path.display());
    }

    let entries = calculator::analyze_image(&client, &img, &args.variables()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_entries(&entries);
    }
    Ok(())
}

fn print_entries(entries: &[ExpressionResult]) {
    if entries.is_empty() {
        println!("{} No expressions recognised", "!".yellow());
        return;
    }

    for entry in entries {
        if entry.assign {
            println!(
                "{} {} := {}",
                "✓".green().bold(),
                entry.expr.bold(),
                entry.result.cyan()
            );
        } else {
            println!(
                "{} {} = {}",
                "✓".green().bold(),
                entry.expr.bold(),
                entry.result.cyan()
            );
        }
    }
}
