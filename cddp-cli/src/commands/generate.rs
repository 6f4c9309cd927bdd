//! Template and generation command handlers

use anyhow::Result;
use cddp_core::domain::generation::GenerationRequest;
use cddp_core::domain::template::TemplateId;
use colored::*;
use serde_json::Value;

use crate::config::Config;

/// Parse a single key=value pair
///
/// The value is taken as JSON when it parses (`5`, `true`, `[...]`, `{...}`)
/// and as a plain string otherwise.
pub fn parse_param(s: &str) -> Result<(String, Value)> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;

    if key.is_empty() {
        anyhow::bail!("invalid KEY=value: empty key in `{}`", s);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// List all templates
pub async fn list_templates(config: &Config) -> Result<()> {
    let templates = config.client().list_templates().await?;

    println!("{}", format!("{} template(s):", templates.len()).bold());
    println!();
    for template in templates {
        println!("  {} {}", "▸".cyan(), template.id.to_string().bold());
        println!("    Required: {}", template.required.join(", ").dimmed());
        if !template.optional.is_empty() {
            println!("    Optional: {}", template.optional.join(", ").dimmed());
        }
    }

    Ok(())
}

/// Generate JSON from a template and print it
pub async fn generate(config: &Config, template: TemplateId, params: Vec<(String, Value)>) -> Result<()> {
    let request: GenerationRequest = params.into_iter().collect();

    let response = match config.client().generate(template, &request).await {
        Ok(response) => response,
        Err(e) => {
            if let Some(last) = e.last_response() {
                eprintln!("{}", "Last model answer:".yellow().bold());
                eprintln!("{}", last.dimmed());
            }
            return Err(e.into());
        }
    };

    match response.json() {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", response.text),
    }

    Ok(())
}
