//! Ingestion task descriptors
//!
//! A descriptor tells the dataframe engine where a file-based source lives,
//! how to read it and with which schema. The server turns it into a
//! [`LoadPlan`]; running the plan is the engine's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ingestion task descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionTask {
    /// Column-list schema (Spark `StructType` JSON)
    pub schema: Value,
    pub input: InputSpec,
}

/// Source section of an ingestion task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Kept raw so an unknown value is reported instead of failing to parse
    #[serde(rename = "read-type")]
    pub read_type: String,
    pub format: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

impl InputSpec {
    pub fn read_type(&self) -> Result<ReadType, UnknownReadType> {
        self.read_type.parse()
    }
}

/// How the source is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadType {
    Batch,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown read-type: {0}")]
pub struct UnknownReadType(pub String);

impl FromStr for ReadType {
    type Err = UnknownReadType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(ReadType::Batch),
            "streaming" => Ok(ReadType::Streaming),
            other => Err(UnknownReadType(other.to_string())),
        }
    }
}

impl fmt::Display for ReadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadType::Batch => write!(f, "batch"),
            ReadType::Streaming => write!(f, "streaming"),
        }
    }
}

/// Reader configuration handed to the dataframe engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPlan {
    pub format: String,
    /// Path resolved for the current execution environment
    pub path: String,
    pub schema: Value,
    /// Reader options, defaults merged with the descriptor's own
    pub options: BTreeMap<String, String>,
    pub streaming: bool,
}
