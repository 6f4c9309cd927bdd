//! Generation Service
//!
//! Renders a prompt template and asks the completion backend for an answer
//! that parses as JSON, retrying a bounded number of times.

use cddp_core::domain::generation::GenerationRequest;
use cddp_core::domain::template::{RenderError, TemplateId};
use serde::de::IgnoredAny;
use std::sync::Arc;
use thiserror::Error;

use crate::repository::CompletionBackend;
use crate::repository::completion::BackendError;

/// Total number of backend calls made for one generation
pub const MAX_ATTEMPTS: u32 = 3;

/// Service error type
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no valid JSON after {attempts} attempts")]
    Failure { attempts: u32, last_response: String },

    #[error("completion backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// True when `text` is one complete JSON value
///
/// Only grammar is checked; the shape of the value is the caller's concern.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}

#[derive(Clone)]
pub struct GenerationService {
    backend: Arc<dyn CompletionBackend>,
}

impl GenerationService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Generates JSON text for a template
    ///
    /// The prompt is rendered once and sent unchanged on every attempt. The
    /// first answer that parses is returned as-is.
    pub async fn generate(&self, template: TemplateId, request: &GenerationRequest) -> Result<String> {
        let prompt = template.template().render(request)?;

        let mut last_response = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            let text = self.backend.complete_template(template, request, &prompt).await?;

            if is_valid_json(&text) {
                tracing::debug!("Template {} answered on attempt {}", template, attempt);
                return Ok(text);
            }

            tracing::warn!(
                "Attempt {}/{} for template {} returned invalid JSON: {}",
                attempt,
                MAX_ATTEMPTS,
                template,
                text
            );
            last_response = text;
        }

        Err(GenerationError::Failure {
            attempts: MAX_ATTEMPTS,
            last_response,
        })
    }
}
