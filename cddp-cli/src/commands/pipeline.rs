//! Pipeline command handlers
//!
//! Handles gallery commands: publishing, listing and viewing pipelines.

use anyhow::{Context, Result};
use cddp_client::CddpClient;
use cddp_core::domain::pipeline::{PipelineArtifact, PipelineSummary};
use clap::Subcommand;
use colored::*;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::id_resolver::resolve_pipeline_id;
use crate::types::IdOrPrefix;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List all published pipelines
    List,
    /// Show a pipeline body
    Get {
        /// Pipeline ID or unambiguous prefix
        id: String,

        /// Account the pipeline was published under
        #[arg(short, long)]
        account: String,
    },
    /// Publish a pipeline from a JSON file
    Publish {
        /// Account to publish under
        #[arg(short, long)]
        account: String,

        /// Path to the pipeline JSON file
        #[arg(short, long)]
        file: String,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        PipelineCommands::List => list_pipelines(&client).await,
        PipelineCommands::Get { id, account } => get_pipeline(&client, &id, &account).await,
        PipelineCommands::Publish { account, file } => {
            publish_pipeline(&client, &account, &file).await
        }
    }
}

/// Turns a pipeline JSON document into an artifact, assigning an id if missing
fn prepare_artifact(document: Value) -> Result<PipelineArtifact> {
    let Value::Object(mut map) = document else {
        anyhow::bail!("Pipeline file must contain a JSON object");
    };

    let has_id = matches!(map.get("id"), Some(Value::String(id)) if !id.trim().is_empty());
    if !has_id {
        map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }

    serde_json::from_value(Value::Object(map))
        .context("Pipeline file needs string `name`, `description` and `industry` fields")
}

/// Publish a pipeline file
async fn publish_pipeline(client: &CddpClient, account: &str, path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline file: {}", path))?;

    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Pipeline file is not valid JSON: {}", path))?;

    let pipeline = prepare_artifact(document)?;
    let stored = client.insert_pipeline(account, &pipeline).await?;

    println!("{}", "✓ Pipeline published successfully!".green().bold());
    println!("  ID:        {}", stored.id.cyan());
    println!("  Name:      {}", stored.name.bold());
    println!("  Account:   {}", account);
    println!(
        "  Published: {}",
        stored.publish_date.as_deref().unwrap_or("-").dimmed()
    );

    Ok(())
}

/// List all pipelines
async fn list_pipelines(client: &CddpClient) -> Result<()> {
    let mut pipelines = client.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        pipelines.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        println!(
            "{}",
            format!("Found {} pipeline(s):", pipelines.len()).bold()
        );
        println!();
        for pipeline in &pipelines {
            print_pipeline_summary(pipeline);
        }
    }

    Ok(())
}

/// Get and display a single pipeline
async fn get_pipeline(client: &CddpClient, id: &str, account: &str) -> Result<()> {
    let id_or_prefix = IdOrPrefix::parse(id);
    let pipeline_id = resolve_pipeline_id(client, &id_or_prefix).await?;

    let pipeline = client.get_pipeline(account, &pipeline_id).await?;

    print_pipeline_details(&pipeline)
}

/// Print a pipeline summary
fn print_pipeline_summary(pipeline: &PipelineSummary) {
    println!("  {} {}", "▸".cyan(), pipeline.name.bold());
    println!("    ID:          {}", pipeline.id().dimmed());
    println!("    Industry:    {}", pipeline.industry);
    println!("    Account:     {}", pipeline.account_id.dimmed());
    println!("    Published:   {}", pipeline.publish_date.dimmed());
    if !pipeline.description.is_empty() {
        println!("    Description: {}", pipeline.description.dimmed());
    }
    println!();
}

/// Print detailed pipeline information
fn print_pipeline_details(pipeline: &PipelineArtifact) -> Result<()> {
    println!("{}", "Pipeline Details:".bold());
    println!("  ID:          {}", pipeline.id.cyan());
    println!("  Name:        {}", pipeline.name.bold());
    println!("  Description: {}", pipeline.description);
    println!("  Industry:    {}", pipeline.industry);
    if let Some(date) = &pipeline.publish_date {
        println!("  Published:   {}", date);
    }

    println!("\n{}", "Body:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", serde_json::to_string_pretty(&pipeline.body)?);
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}
