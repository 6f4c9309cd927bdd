//! Template and generation endpoints

use cddp_core::domain::generation::GenerationRequest;
use cddp_core::domain::template::TemplateId;
use cddp_core::dto::generation::{GenerateResponse, TemplateInfo};

use crate::CddpClient;
use crate::error::Result;

impl CddpClient {
    /// List the available templates with their parameters
    pub async fn list_templates(&self) -> Result<Vec<TemplateInfo>> {
        let url = format!("{}/templates", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Generate JSON text from a template
    ///
    /// When the server gives up after its retries the error carries the last
    /// invalid answer, see [`crate::ClientError::last_response`].
    pub async fn generate(
        &self,
        template: TemplateId,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse> {
        let url = format!("{}/generate/{}", self.base_url, template);
        let response = self.client.post(&url).json(request).send().await?;

        self.handle_response(response).await
    }
}
