//! Ingestion Service
//!
//! Turns an ingestion descriptor into the reader configuration for the
//! dataframe engine.

use cddp_core::domain::ingestion::{IngestionTask, LoadPlan, ReadType, UnknownReadType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;

/// Service error type
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    UnknownReadType(#[from] UnknownReadType),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

pub type Result<T> = std::result::Result<T, IngestionError>;

/// Where descriptor paths are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEnvironment {
    /// Paths are used exactly as written
    Databricks,
    /// Paths are anchored under a local stand-in for the file store
    Local { filestore_root: PathBuf },
}

impl PathEnvironment {
    pub fn from_config(config: &Config) -> Self {
        if config.databricks {
            PathEnvironment::Databricks
        } else {
            PathEnvironment::Local {
                filestore_root: config.filestore_root.clone(),
            }
        }
    }

    pub fn resolve(&self, path: &str) -> String {
        match self {
            PathEnvironment::Databricks => path.to_string(),
            PathEnvironment::Local { filestore_root } => filestore_root
                .join(path.trim_start_matches('/'))
                .to_string_lossy()
                .into_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionService {
    environment: PathEnvironment,
}

impl IngestionService {
    pub fn new(environment: PathEnvironment) -> Self {
        Self { environment }
    }

    /// Builds the load plan for a descriptor
    pub fn plan(&self, task: &IngestionTask) -> Result<LoadPlan> {
        let read_type = task.input.read_type()?;
        validate_schema(&task.schema)?;

        let mut options = default_options(read_type);
        if let Some(overrides) = &task.input.options {
            for (key, value) in overrides {
                options.insert(key.clone(), option_value(value));
            }
        }

        let plan = LoadPlan {
            format: task.input.format.clone(),
            path: self.environment.resolve(&task.input.path),
            schema: task.schema.clone(),
            options,
            streaming: read_type == ReadType::Streaming,
        };

        tracing::debug!(
            "Planned {} {} load from {}",
            read_type,
            plan.format,
            plan.path
        );

        Ok(plan)
    }
}

fn default_options(read_type: ReadType) -> BTreeMap<String, String> {
    let mut options = BTreeMap::from([
        ("header".to_string(), "true".to_string()),
        ("inferSchema".to_string(), "true".to_string()),
    ]);
    if read_type == ReadType::Batch {
        options.insert("multiline".to_string(), "true".to_string());
    }
    options
}

/// Reader options are strings; bare strings are taken verbatim
fn option_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn validate_schema(schema: &Value) -> Result<()> {
    let object = schema
        .as_object()
        .ok_or_else(|| IngestionError::InvalidSchema("schema must be a JSON object".to_string()))?;

    match object.get("fields") {
        Some(Value::Array(_)) => Ok(()),
        _ => Err(IngestionError::InvalidSchema(
            "schema must have a `fields` array".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(read_type: &str) -> IngestionTask {
        serde_json::from_value(json!({
            "schema": {
                "type": "struct",
                "fields": [{ "name": "id", "type": "integer", "nullable": false, "metadata": {} }]
            },
            "input": {
                "read-type": read_type,
                "format": "csv",
                "path": "/FileStore/cddp/landing/flights/"
            }
        }))
        .unwrap()
    }

    fn local() -> IngestionService {
        IngestionService::new(PathEnvironment::Local {
            filestore_root: PathBuf::from("/tmp/filestore"),
        })
    }

    #[test]
    fn test_batch_plan() {
        let plan = local().plan(&task("batch")).unwrap();

        assert!(!plan.streaming);
        assert_eq!(plan.format, "csv");
        assert_eq!(plan.options["header"], "true");
        assert_eq!(plan.options["inferSchema"], "true");
        assert_eq!(plan.options["multiline"], "true");
        assert_eq!(plan.schema["fields"][0]["name"], "id");
    }

    #[test]
    fn test_streaming_plan() {
        let plan = local().plan(&task("streaming")).unwrap();

        assert!(plan.streaming);
        assert!(!plan.options.contains_key("multiline"));
    }

    #[test]
    fn test_unknown_read_type() {
        let err = local().plan(&task("micro-batch")).unwrap_err();
        assert!(matches!(err, IngestionError::UnknownReadType(_)));
        assert_eq!(err.to_string(), "Unknown read-type: micro-batch");
    }

    #[test]
    fn test_descriptor_options_override_defaults() {
        let mut task = task("batch");
        task.input.options = Some(
            json!({ "header": false, "sep": ";" })
                .as_object()
                .unwrap()
                .clone(),
        );

        let plan = local().plan(&task).unwrap();
        assert_eq!(plan.options["header"], "false");
        assert_eq!(plan.options["sep"], ";");
        assert_eq!(plan.options["inferSchema"], "true");
    }

    #[test]
    fn test_path_resolution() {
        let local = PathEnvironment::Local {
            filestore_root: PathBuf::from("/tmp/filestore"),
        };
        assert_eq!(
            local.resolve("/FileStore/landing/x.csv"),
            "/tmp/filestore/FileStore/landing/x.csv"
        );
        assert_eq!(local.resolve("relative/x.csv"), "/tmp/filestore/relative/x.csv");

        assert_eq!(
            PathEnvironment::Databricks.resolve("/FileStore/landing/x.csv"),
            "/FileStore/landing/x.csv"
        );
    }

    #[test]
    fn test_schema_must_list_fields() {
        let mut bad = task("batch");
        bad.schema = json!(["id", "name"]);
        assert!(matches!(
            local().plan(&bad),
            Err(IngestionError::InvalidSchema(_))
        ));

        bad.schema = json!({ "type": "struct" });
        assert!(matches!(
            local().plan(&bad),
            Err(IngestionError::InvalidSchema(_))
        ));
    }
}
