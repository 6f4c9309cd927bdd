//! CDDP HTTP Client
//!
//! A small, typed HTTP client for the CDDP server API, used by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use cddp_client::CddpClient;
//! use cddp_core::domain::generation::GenerationRequest;
//! use cddp_core::domain::template::TemplateId;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CddpClient::new("http://localhost:8080");
//!
//!     let request = GenerationRequest::new().param("industry_name", "Airline");
//!     let response = client.generate(TemplateId::PipelineScenarios, &request).await?;
//!
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```

pub mod error;
mod generation;
mod ingestion;
mod pipelines;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the CDDP server API
///
/// Methods are grouped by area:
/// - Templates and generation
/// - Gallery pipelines (publish, list, load)
/// - Ingestion planning
#[derive(Debug, Clone)]
pub struct CddpClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl CddpClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use cddp_client::CddpClient;
    ///
    /// let client = CddpClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    /// Generation can take several model round trips, so keep timeouts generous.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let response_url = response.url().path().to_string();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Request to {} failed with status {}", response_url, status);
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Percent-encodes a single path segment
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CddpClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = CddpClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = CddpClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("acct 1"), "acct%201");
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("p-1"), "p-1");
    }
}
