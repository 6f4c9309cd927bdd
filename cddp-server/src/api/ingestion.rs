//! Ingestion API Handlers

use axum::{Json, extract::State};
use cddp_core::domain::ingestion::{IngestionTask, LoadPlan};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /ingestion/plan
/// Resolve an ingestion descriptor into a load plan
pub async fn plan_ingestion(
    State(state): State<AppState>,
    Json(task): Json<IngestionTask>,
) -> ApiResult<Json<LoadPlan>> {
    tracing::debug!("Planning {} ingestion from {}", task.input.format, task.input.path);

    let plan = state.ingestion.plan(&task)?;

    Ok(Json(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::api::tests::memory_state;
    use serde_json::json;

    fn task(read_type: &str) -> IngestionTask {
        serde_json::from_value(json!({
            "schema": { "type": "struct", "fields": [] },
            "input": { "read-type": read_type, "format": "json", "path": "/landing/orders/" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_plan_streaming() {
        let Json(plan) = plan_ingestion(State(memory_state()), Json(task("streaming")))
            .await
            .unwrap();

        assert!(plan.streaming);
        assert!(plan.path.ends_with("landing/orders/"));
    }

    #[tokio::test]
    async fn test_plan_unknown_read_type() {
        let result = plan_ingestion(State(memory_state()), Json(task("nightly"))).await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Unknown read-type: nightly"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
