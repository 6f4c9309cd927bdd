//! Completion Repository
//!
//! Sends one prompt to a hosted chat-completion deployment and returns the
//! first choice's text. One call is one request; retries belong to the
//! generation service.

use async_trait::async_trait;
use cddp_core::domain::generation::GenerationRequest;
use cddp_core::domain::template::TemplateId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CompletionConfig;

/// Errors raised while talking to the completion backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("completion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse completion response: {0}")]
    ParseError(String),

    #[error("completion response contained no choices")]
    EmptyResponse,

    #[error("backend only answers known templates")]
    Unsupported,
}

/// Repository trait for text completion
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the prompt as a single user message and returns the reply text
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;

    /// Answers a rendered template
    ///
    /// The default sends the prompt through [`CompletionBackend::complete`].
    /// Backends without a model answer from the template and its parameters.
    async fn complete_template(
        &self,
        _template: TemplateId,
        _request: &GenerationRequest,
        prompt: &str,
    ) -> Result<String, BackendError> {
        self.complete(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Azure OpenAI chat-completions implementation of CompletionBackend
///
/// The underlying `reqwest::Client` is reused across calls.
#[derive(Debug, Clone)]
pub struct AzureOpenAiBackend {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl AzureOpenAiBackend {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: CompletionConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = ChatRequest {
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            model: self.config.model.as_deref(),
        };

        tracing::debug!(
            "Requesting completion from deployment {} (model: {})",
            self.config.deployment,
            self.config.model.as_deref().unwrap_or("default")
        );

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse)
    }
}
