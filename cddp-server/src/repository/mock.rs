//! Canned completion backend
//!
//! Answers every template with fixed airline-industry JSON so the server can
//! run without a hosted model. Selected with `COMPLETION_BACKEND=mock`.

use async_trait::async_trait;
use cddp_core::domain::generation::{GenerationRequest, render_value};
use cddp_core::domain::template::TemplateId;
use serde_json::{Value, json};

use super::CompletionBackend;
use super::completion::BackendError;

const PIPELINE_SCENARIOS: &str = include_str!("mock/pipeline_scenarios.json");
const INDUSTRY_TABLES: &str = include_str!("mock/industry_tables.json");
const NEXT_TABLES: &str = include_str!("mock/next_tables.json");
const PROCESSING_LOGIC: &str = include_str!("mock/processing_logic.json");
const CUSTOM_PROCESSING_LOGIC: &str = include_str!("mock/custom_processing_logic.json");
const SAMPLE_DATA: &str = include_str!("mock/sample_data.json");

/// Completion backend returning canned answers
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }

    /// Canned answer for a template
    pub fn answer(&self, template: TemplateId, request: &GenerationRequest) -> Result<String, BackendError> {
        match template {
            TemplateId::PipelineScenarios => Ok(PIPELINE_SCENARIOS.to_string()),
            TemplateId::IndustryTables => Ok(INDUSTRY_TABLES.to_string()),
            TemplateId::ProcessingLogic => Ok(PROCESSING_LOGIC.to_string()),
            TemplateId::NextTable => next_table(request),
            TemplateId::CustomTable => Ok(custom_table(request).to_string()),
            TemplateId::CustomProcessingLogic => custom_processing_logic(request),
            TemplateId::SampleData => sample_data(request),
        }
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
        Err(BackendError::Unsupported)
    }

    async fn complete_template(
        &self,
        template: TemplateId,
        request: &GenerationRequest,
        _prompt: &str,
    ) -> Result<String, BackendError> {
        tracing::debug!("Answering {} from canned responses", template);
        self.answer(template, request)
    }
}

fn parse(text: &str) -> Result<Value, BackendError> {
    serde_json::from_str(text).map_err(|e| BackendError::ParseError(e.to_string()))
}

/// Parameter as JSON, accepting both nested JSON and JSON written as a string
fn json_param(request: &GenerationRequest, name: &str) -> Option<Value> {
    match request.get(name)? {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}

/// One table per call, advancing with the number already recommended
fn next_table(request: &GenerationRequest) -> Result<String, BackendError> {
    let tables = parse(NEXT_TABLES)?;
    let tables = tables.as_array().map(Vec::as_slice).unwrap_or_default();
    if tables.is_empty() {
        return Err(BackendError::EmptyResponse);
    }

    let recommended = match json_param(request, "recommended_tables") {
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    };

    Ok(tables[recommended % tables.len()].to_string())
}

fn custom_table(request: &GenerationRequest) -> Value {
    let text = |name: &str| request.get(name).map(render_value).unwrap_or_default();
    let table_name = text("custom_table_name");

    json!({
        "table_name": table_name,
        "table_description": text("custom_table_description"),
        "columns": [
            {
                "column_name": format!("{}_id", table_name),
                "data_type": "integer",
                "is_null": false,
                "is_primary_key": true,
                "is_foreign_key": false
            },
            {
                "column_name": "name",
                "data_type": "varchar(255)",
                "is_null": false,
                "is_primary_key": false,
                "is_foreign_key": false
            }
        ]
    })
}

/// Canned join, with the output table renamed to the requested one
fn custom_processing_logic(request: &GenerationRequest) -> Result<String, BackendError> {
    let mut logic = parse(CUSTOM_PROCESSING_LOGIC)?;
    if let Some(name) = request.get("output_table_name") {
        logic["schema"]["table_name"] = Value::String(render_value(name));
    }
    Ok(logic.to_string())
}

/// Rows for the flights, passengers and bookings tables; other tables get none
fn sample_data(request: &GenerationRequest) -> Result<String, BackendError> {
    let table_name = json_param(request, "target_table")
        .and_then(|table| table.get("table_name").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    let samples = parse(SAMPLE_DATA)?;
    let mut rows = match samples.get(&table_name) {
        Some(Value::Array(rows)) => rows.clone(),
        _ => Vec::new(),
    };

    let limit = request.get("number_of_lines").and_then(|n| match n {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    if let Some(limit) = limit {
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    Ok(Value::Array(rows).to_string())
}
