//! Prompt templates
//!
//! Every generation use case is one fixed template text plus the parameters
//! it needs. Placeholders are written `{name}`; `{{` and `}}` render as
//! literal braces so the JSON answer shapes can be embedded in the text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::generation::{GenerationRequest, render_value};

/// Errors raised while filling a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A required parameter was not supplied by the caller
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// The template text references a parameter that was not supplied
    #[error("template references unknown parameter: {0}")]
    UnknownPlaceholder(String),

    /// The template text itself cannot be parsed
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },
}

impl RenderError {
    /// `true` when the caller is at fault rather than the template
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Self::MissingParameter(_))
    }
}

/// Identifier of one of the fixed templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    /// Pipeline scenarios for an industry
    PipelineScenarios,
    /// A batch of table schemas for an industry and its context
    IndustryTables,
    /// One more table, not duplicating the ones recommended so far
    NextTable,
    /// A single named custom table from its description
    CustomTable,
    /// Cleaning, transformation or aggregation logic over known tables
    ProcessingLogic,
    /// SQL plus output schema for a natural-language requirement
    CustomProcessingLogic,
    /// Synthetic rows for a table
    SampleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template: {0}")]
pub struct UnknownTemplate(pub String);

impl TemplateId {
    const ALL: [TemplateId; 7] = [
        TemplateId::PipelineScenarios,
        TemplateId::IndustryTables,
        TemplateId::NextTable,
        TemplateId::CustomTable,
        TemplateId::ProcessingLogic,
        TemplateId::CustomProcessingLogic,
        TemplateId::SampleData,
    ];

    pub fn all() -> &'static [TemplateId] {
        &Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::PipelineScenarios => "pipeline-scenarios",
            TemplateId::IndustryTables => "industry-tables",
            TemplateId::NextTable => "next-table",
            TemplateId::CustomTable => "custom-table",
            TemplateId::ProcessingLogic => "processing-logic",
            TemplateId::CustomProcessingLogic => "custom-processing-logic",
            TemplateId::SampleData => "sample-data",
        }
    }

    /// The template text and parameter lists for this use case
    pub fn template(&self) -> PromptTemplate {
        match self {
            TemplateId::PipelineScenarios => {
                PromptTemplate::new(PIPELINE_SCENARIOS, &["industry_name"])
            }
            TemplateId::IndustryTables => PromptTemplate::new(
                INDUSTRY_TABLES,
                &["industry_name", "industry_contexts"],
            ),
            TemplateId::NextTable => {
                PromptTemplate::new(NEXT_TABLE, &["industry_name", "industry_contexts"])
                    .with_optional(&["recommended_tables"])
            }
            TemplateId::CustomTable => PromptTemplate::new(
                CUSTOM_TABLE,
                &[
                    "industry_name",
                    "industry_contexts",
                    "recommended_tables",
                    "custom_table_name",
                    "custom_table_description",
                ],
            ),
            TemplateId::ProcessingLogic => PromptTemplate::new(
                PROCESSING_LOGIC,
                &[
                    "industry_name",
                    "industry_contexts",
                    "recommended_tables",
                    "processing_logic",
                ],
            ),
            TemplateId::CustomProcessingLogic => PromptTemplate::new(
                CUSTOM_PROCESSING_LOGIC,
                &[
                    "industry_name",
                    "industry_contexts",
                    "involved_tables",
                    "custom_data_processing_logic",
                    "output_table_name",
                ],
            ),
            TemplateId::SampleData => PromptTemplate::new(
                SAMPLE_DATA,
                &["industry_name", "number_of_lines", "target_table"],
            )
            .with_optional(&["column_values_patterns"]),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// A fixed template text with its parameter lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
}

impl PromptTemplate {
    pub fn new(text: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            text,
            required,
            optional: &[],
        }
    }

    /// Declares parameters that render as empty text when absent
    pub fn with_optional(mut self, optional: &'static [&'static str]) -> Self {
        self.optional = optional;
        self
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn required(&self) -> &'static [&'static str] {
        self.required
    }

    pub fn optional(&self) -> &'static [&'static str] {
        self.optional
    }

    /// Names referenced by the template text, in order of appearance
    pub fn placeholders(&self) -> Result<Vec<&'static str>, RenderError> {
        Ok(parse_segments(self.text)?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name),
                Segment::Literal(_) => None,
            })
            .collect())
    }

    /// Substitutes every placeholder with its parameter value
    pub fn render(&self, request: &GenerationRequest) -> Result<String, RenderError> {
        if let Some(missing) = self.required.iter().find(|name| !request.contains(name)) {
            return Err(RenderError::MissingParameter(missing.to_string()));
        }

        let mut prompt = String::with_capacity(self.text.len());
        for segment in parse_segments(self.text)? {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Placeholder(name) => match request.get(name) {
                    Some(value) => prompt.push_str(&render_value(value)),
                    None if self.optional.contains(&name) => {}
                    None => return Err(RenderError::UnknownPlaceholder(name.to_string())),
                },
            }
        }

        Ok(prompt)
    }
}

// =============================================================================
// Template Parsing
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn parse_segments(text: &str) -> Result<Vec<Segment<'_>>, RenderError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                push_literal(&mut segments, &text[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                push_literal(&mut segments, &text[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'{' => {
                push_literal(&mut segments, &text[literal_start..i]);
                let rest = &text[i + 1..];
                let end = rest.find('}').ok_or(RenderError::Malformed {
                    position: i,
                    reason: "unterminated placeholder",
                })?;
                let name = &rest[..end];
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(RenderError::Malformed {
                        position: i,
                        reason: "placeholder name must be a non-empty identifier",
                    });
                }
                segments.push(Segment::Placeholder(name));
                i += end + 2;
                literal_start = i;
            }
            b'}' => {
                return Err(RenderError::Malformed {
                    position: i,
                    reason: "unmatched '}'",
                });
            }
            _ => i += 1,
        }
    }
    push_literal(&mut segments, &text[literal_start..]);

    Ok(segments)
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text));
    }
}

// =============================================================================
// Template Texts
// =============================================================================

const PIPELINE_SCENARIOS: &str = r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Recommend 7 to 10 different data processing pipeline scenarios. Each scenario collects data sources, transforms the data and produces aggregated metrics.
Answer with a JSON array only, shaped like this:
[
    {{
        "pipeline_name": "{{name of the pipeline}}",
        "description": "{{short description of the pipeline}}",
        "stages": [
            {{ "stage": "staging", "description": "{{data sources collected for the pipeline}}" }},
            {{ "stage": "standard", "description": "{{transformation logic}}" }},
            {{ "stage": "serving", "description": "{{aggregation logic}}" }}
        ]
    }}
]
"#;

// Table schema answer shape shared by the table templates.
macro_rules! table_shape {
    () => {
        r#"{{
    "table_name": "{{table name}}",
    "table_description": "{{table description}}",
    "columns": [
        {{
            "column_name": "{{column name}}",
            "data_type": "{{data type}}",
            "is_null": {{true or false}},
            "is_primary_key": {{true or false}},
            "is_foreign_key": {{true or false}}
        }}
    ]
}}"#
    };
}

const INDUSTRY_TABLES: &str = concat!(
    r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Context of the industry:
{industry_contexts}

Recommend 7 to 10 database tables with their schema for this context.
Answer with a JSON array of objects shaped like this:
"#,
    table_shape!(),
    "\n"
);

const NEXT_TABLE: &str = concat!(
    r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Context of the industry:
{industry_contexts}

Recommend one database table with its schema for this context.
Answer with a single JSON object shaped like this, booleans strictly in lower case:
"#,
    table_shape!(),
    r#"

Tables already recommended:
{recommended_tables}

Recommend one more table that is not in the list above (if the list is empty, start a new one).
"#
);

const CUSTOM_TABLE: &str = r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Context of the industry:
{industry_contexts}

You previously recommended these tables, in JSON:
{recommended_tables}

Add a {custom_table_name} table using the same JSON schema format, with as many realistic columns as the description below allows:
{custom_table_description}

Answer with the new table only, as a single JSON object.
"#;

const PROCESSING_LOGIC: &str = r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Context of the industry:
{industry_contexts}

You previously recommended these tables, in JSON:
{recommended_tables}

Recommend 5 to 7 {processing_logic} steps over these tables as Spark SQL statements.
Answer with a JSON array shaped like this:
[
    {{
        "description": "{{what the step does}}",
        "involved_tables": ["{{table X}}", "{{table Y}}"],
        "sql": "{{Spark SQL statement}}",
        "schema": "{{output table schema as a JSON string}}"
    }}
]
"#;

const CUSTOM_PROCESSING_LOGIC: &str = r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Context of the industry:
{industry_contexts}

Available tables with their schema, in JSON:
{involved_tables}

Processing requirement:
{custom_data_processing_logic}

Write a Spark SQL statement for the requirement together with its output schema.
Answer with a single JSON object shaped like this:
{{
    "sql": "{{Spark SQL statement}}",
    "schema": {{
        "table_name": "{output_table_name}",
        "columns": [
            {{
                "column_name": "{{column name}}",
                "data_type": "{{data type}}",
                "is_null": {{true or false}},
                "is_primary_key": {{true or false}},
                "is_foreign_key": {{true or false}}
            }}
        ]
    }}
}}
The "table_name" value must be exactly "{output_table_name}".
"#;

const SAMPLE_DATA: &str = r#"You are a data engineer who knows the IT systems of the {industry_name} industry.
Generate {number_of_lines} rows of sample data for the table below (name and schema in JSON):
{target_table}

Patterns for column values, in JSON (ignore if empty):
{column_values_patterns}

Answer with a JSON array of row objects shaped like this:
[
    {{ "{{column X}}": "{{value}}", "{{column Y}}": "{{value}}" }}
]
"#;
