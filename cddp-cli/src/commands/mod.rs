//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generate;
mod ingest;
mod pipeline;

pub use ingest::IngestCommands;
pub use pipeline::PipelineCommands;

use anyhow::Result;
use cddp_core::domain::template::TemplateId;
use clap::Subcommand;
use serde_json::Value;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List generation templates and their parameters
    Templates,
    /// Generate JSON from a template
    Generate {
        /// Template id (e.g., pipeline-scenarios, sample-data)
        template: TemplateId,

        /// Parameters as key=value pairs; values are read as JSON when they parse
        #[arg(short, long, value_parser = generate::parse_param)]
        param: Vec<(String, Value)>,
    },
    /// Pipeline gallery
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Ingestion descriptors
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Templates => generate::list_templates(config).await,
        Commands::Generate { template, param } => generate::generate(config, template, param).await,
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Ingest { command } => ingest::handle_ingest_command(command, config).await,
    }
}
