//! Pipeline artifact domain types
//!
//! A pipeline artifact is the document the gallery publishes: a named,
//! described, industry-tagged JSON body. Bodies live in blob storage; two
//! small index records make them discoverable without fetching the body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of the server-assigned `publish_date`
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path of a pipeline body inside the blob container
///
/// Bodies are namespaced by account so two accounts never share a blob path.
pub fn blob_path(account_id: &str, pipeline_id: &str) -> String {
    format!("{}/{}.json", account_id, pipeline_id)
}

/// Pipeline artifact
///
/// Everything besides the searchable metadata is kept in `body` and
/// flattened into the same JSON object, so stages, tables, processing logic
/// or sample data round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub id: String,
    pub name: String,
    pub description: String,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl PipelineArtifact {
    /// Overwrites `publish_date` with the given instant
    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.publish_date = Some(at.format(PUBLISH_DATE_FORMAT).to_string());
    }

    /// Blob path of this artifact for the given account
    pub fn blob_path(&self, account_id: &str) -> String {
        blob_path(account_id, &self.id)
    }
}

/// Full index record
///
/// Partition and row key are both the pipeline id, so every pipeline is a
/// singleton partition. Points at the blob holding the body; `body` is only
/// read as a fallback when no blob reference is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub partition_key: String,
    pub row_key: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PipelineRecord {
    /// Record referencing a body already written to blob storage
    pub fn for_blob(account_id: &str, pipeline: &PipelineArtifact, blob_url: String) -> Self {
        Self {
            partition_key: pipeline.id.clone(),
            row_key: pipeline.id.clone(),
            account_id: account_id.to_string(),
            blob_url: Some(blob_url),
            body: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }
}

/// Summary index record used for listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub partition_key: String,
    pub row_key: String,
    pub name: String,
    pub description: String,
    pub publish_date: String,
    pub industry: String,
    pub account_id: String,
}

impl PipelineSummary {
    pub fn from_artifact(account_id: &str, pipeline: &PipelineArtifact) -> Self {
        Self {
            partition_key: pipeline.id.clone(),
            row_key: pipeline.id.clone(),
            name: pipeline.name.clone(),
            description: pipeline.description.clone(),
            publish_date: pipeline.publish_date.clone().unwrap_or_default(),
            industry: pipeline.industry.clone(),
            account_id: account_id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.row_key
    }
}
