//! Gallery pipeline endpoints

use cddp_core::domain::pipeline::{PipelineArtifact, PipelineSummary};

use crate::error::Result;
use crate::{CddpClient, segment};

impl CddpClient {
    // =============================================================================
    // Pipeline Gallery
    // =============================================================================

    /// Publish a pipeline under an account
    ///
    /// # Returns
    /// The pipeline as stored, with its publish date set by the server
    pub async fn insert_pipeline(
        &self,
        account_id: &str,
        pipeline: &PipelineArtifact,
    ) -> Result<PipelineArtifact> {
        let url = format!("{}/pipelines/{}", self.base_url, segment(account_id));
        let response = self.client.post(&url).json(pipeline).send().await?;

        self.handle_response(response).await
    }

    /// List every published pipeline summary
    pub async fn list_pipelines(&self) -> Result<Vec<PipelineSummary>> {
        let url = format!("{}/pipelines", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Load a pipeline body
    pub async fn get_pipeline(&self, account_id: &str, pipeline_id: &str) -> Result<PipelineArtifact> {
        let url = format!(
            "{}/pipelines/{}/{}",
            self.base_url,
            segment(account_id),
            segment(pipeline_id)
        );
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn artifact_json() -> serde_json::Value {
        json!({
            "id": "p-1",
            "name": "Flight Delays",
            "description": "Delay metrics",
            "industry": "Airline",
            "publish_date": "2024-03-05 07:08:09",
            "stages": []
        })
    }

    #[tokio::test]
    async fn test_insert_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pipelines/acct-1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(artifact_json()))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline: PipelineArtifact = serde_json::from_value(artifact_json()).unwrap();
        let stored = CddpClient::new(server.uri())
            .insert_pipeline("acct-1", &pipeline)
            .await
            .unwrap();

        assert_eq!(stored.publish_date.as_deref(), Some("2024-03-05 07:08:09"));
    }

    #[tokio::test]
    async fn test_get_pipeline_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pipelines/acct-1/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "Pipeline missing not found" })),
            )
            .mount(&server)
            .await;

        let err = CddpClient::new(server.uri())
            .get_pipeline("acct-1", "missing")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("Pipeline missing not found"));
    }

    #[tokio::test]
    async fn test_list_pipelines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pipelines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "partition_key": "p-1",
                "row_key": "p-1",
                "name": "Flight Delays",
                "description": "Delay metrics",
                "publish_date": "2024-03-05 07:08:09",
                "industry": "Airline",
                "account_id": "acct-1"
            }])))
            .mount(&server)
            .await;

        let list = CddpClient::new(server.uri()).list_pipelines().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id(), "p-1");
    }
}
