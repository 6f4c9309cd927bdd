//! Server configuration
//!
//! Every setting is read once at startup, validated eagerly and passed into
//! the constructors that need it. Nothing reads the environment after that.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_API_VERSION: &str = "2023-05-15";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BLOB_CONTAINER: &str = "pipelines";

/// Configuration errors, all raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where index records are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL reached through the connection string
    Postgres { connection_string: String },
    /// Process-local maps, lost on restart
    Memory,
}

/// Where completions come from
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionProvider {
    /// Azure OpenAI chat-completions deployment
    AzureOpenAi(CompletionConfig),
    /// Canned answers per template, no network access
    Mock,
}

/// Hosted chat-completion deployment
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Base endpoint (e.g., "https://my-resource.openai.azure.com")
    pub api_base: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    /// Sent in the request body when set
    pub model: Option<String>,
    pub temperature: f32,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind_addr: String,

    pub completion: CompletionProvider,

    pub storage: StorageBackend,

    /// Directory under which blob containers are created
    pub blob_root: PathBuf,

    /// Container holding pipeline bodies
    pub blob_container: String,

    /// Local directory standing in for the Databricks file store
    pub filestore_root: PathBuf,

    /// Running inside a Databricks runtime: ingestion paths are used as-is
    pub databricks: bool,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - COMPLETION_BACKEND (optional, `azure` or `mock`, default: azure)
    /// - OPENAI_API_BASE (required for the azure backend)
    /// - OPENAI_API_KEY (required for the azure backend)
    /// - OPENAI_DEPLOYMENT (required for the azure backend)
    /// - OPENAI_API_VERSION (optional, default: 2023-05-15)
    /// - OPENAI_MODEL (optional)
    /// - OPENAI_TEMPERATURE (optional, default: 0.7)
    /// - STORAGE_BACKEND (optional, `postgres` or `memory`, default: postgres)
    /// - STORAGE_CONNECTION_STRING (required for the postgres backend)
    /// - BLOB_STORAGE_ROOT (optional, default: ./blobs)
    /// - BLOB_CONTAINER (optional, default: pipelines)
    /// - FILESTORE_ROOT (optional, default: ./filestore)
    /// - DATABRICKS_RUNTIME_VERSION (set by Databricks)
    /// - CDDP_BIND_ADDR (optional, default: 0.0.0.0:8080)
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(utf8_vars(std::env::vars_os()))
    }

    /// Same as [`Config::from_env`] over an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let temperature = match get("OPENAI_TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().map_err(|e| ConfigError::Invalid {
                name: "OPENAI_TEMPERATURE",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TEMPERATURE,
        };

        let completion = match get("COMPLETION_BACKEND").as_deref() {
            None | Some("azure") => CompletionProvider::AzureOpenAi(CompletionConfig {
                api_base: require("OPENAI_API_BASE")?,
                api_key: require("OPENAI_API_KEY")?,
                deployment: require("OPENAI_DEPLOYMENT")?,
                api_version: get("OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.into()),
                model: get("OPENAI_MODEL"),
                temperature,
            }),
            Some("mock") => CompletionProvider::Mock,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "COMPLETION_BACKEND",
                    reason: format!("expected `azure` or `mock`, got `{}`", other),
                });
            }
        };

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres {
                connection_string: require("STORAGE_CONNECTION_STRING")?,
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    reason: format!("expected `postgres` or `memory`, got `{}`", other),
                });
            }
        };

        let config = Self {
            bind_addr: get("CDDP_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            completion,
            storage,
            blob_root: get("BLOB_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./blobs")),
            blob_container: get("BLOB_CONTAINER")
                .unwrap_or_else(|| DEFAULT_BLOB_CONTAINER.into()),
            filestore_root: get("FILESTORE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./filestore")),
            databricks: get("DATABRICKS_RUNTIME_VERSION").is_some(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let CompletionProvider::AzureOpenAi(completion) = &self.completion {
            let api_base = &completion.api_base;
            if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    name: "OPENAI_API_BASE",
                    reason: "must start with http:// or https://".to_string(),
                });
            }

            if !(0.0..=2.0).contains(&completion.temperature) {
                return Err(ConfigError::Invalid {
                    name: "OPENAI_TEMPERATURE",
                    reason: "must be between 0 and 2".to_string(),
                });
            }
        }

        if self.blob_container.contains('/') {
            return Err(ConfigError::Invalid {
                name: "BLOB_CONTAINER",
                reason: "must not contain '/'".to_string(),
            });
        }

        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                name: "CDDP_BIND_ADDR",
                reason: format!("`{}` is not a socket address", self.bind_addr),
            });
        }

        Ok(())
    }
}

/// Keeps the variables whose name and value are both valid UTF-8
fn utf8_vars(vars: impl Iterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
