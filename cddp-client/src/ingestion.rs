//! Ingestion endpoints

use cddp_core::domain::ingestion::{IngestionTask, LoadPlan};

use crate::CddpClient;
use crate::error::Result;

impl CddpClient {
    /// Resolve an ingestion descriptor into a load plan
    pub async fn plan_ingestion(&self, task: &IngestionTask) -> Result<LoadPlan> {
        let url = format!("{}/ingestion/plan", self.base_url);
        let response = self.client.post(&url).json(task).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_plan_ingestion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ingestion/plan"))
            .and(body_partial_json(json!({ "input": { "read-type": "batch" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "format": "csv",
                "path": "filestore/landing/x.csv",
                "schema": { "type": "struct", "fields": [] },
                "options": { "header": "true", "inferSchema": "true", "multiline": "true" },
                "streaming": false
            })))
            .mount(&server)
            .await;

        let task: IngestionTask = serde_json::from_value(json!({
            "schema": { "type": "struct", "fields": [] },
            "input": { "read-type": "batch", "format": "csv", "path": "/landing/x.csv" }
        }))
        .unwrap();

        let plan = CddpClient::new(server.uri()).plan_ingestion(&task).await.unwrap();
        assert!(!plan.streaming);
        assert_eq!(plan.options["multiline"], "true");
    }

    #[tokio::test]
    async fn test_plan_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Unknown read-type: nightly" })),
            )
            .mount(&server)
            .await;

        let task: IngestionTask = serde_json::from_value(json!({
            "schema": { "fields": [] },
            "input": { "read-type": "nightly", "format": "csv", "path": "x" }
        }))
        .unwrap();

        let err = CddpClient::new(server.uri()).plan_ingestion(&task).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Unknown read-type: nightly"));
    }
}
