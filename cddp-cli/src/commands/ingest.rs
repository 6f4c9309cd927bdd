//! Ingestion command handlers

use anyhow::{Context, Result};
use cddp_core::domain::ingestion::IngestionTask;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Ingestion subcommands
#[derive(Subcommand)]
pub enum IngestCommands {
    /// Resolve an ingestion descriptor into a load plan
    Plan {
        /// Path to the ingestion task JSON file
        #[arg(short, long)]
        task: String,
    },
}

/// Handle ingestion commands
pub async fn handle_ingest_command(command: IngestCommands, config: &Config) -> Result<()> {
    match command {
        IngestCommands::Plan { task } => plan(config, &task).await,
    }
}

async fn plan(config: &Config, path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file: {}", path))?;

    let task: IngestionTask = serde_json::from_str(&content)
        .with_context(|| format!("Invalid ingestion task: {}", path))?;

    let plan = config.client().plan_ingestion(&task).await?;

    let mode = if plan.streaming { "streaming" } else { "batch" };
    println!(
        "{} {} {} from {}",
        "✓".green().bold(),
        mode.cyan(),
        plan.format.bold(),
        plan.path
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
