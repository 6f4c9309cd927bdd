//! Pipeline API Handlers
//!
//! HTTP endpoints for publishing and browsing gallery pipelines.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cddp_core::domain::pipeline::{PipelineArtifact, PipelineSummary};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /pipelines/{account_id}
/// Publish a pipeline; returns it with the assigned publish date
pub async fn insert_pipeline(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(pipeline): Json<PipelineArtifact>,
) -> ApiResult<(StatusCode, Json<PipelineArtifact>)> {
    tracing::info!("Publishing pipeline {} for account {}", pipeline.id, account_id);

    let stored = state.gallery.insert_pipeline(&account_id, pipeline).await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /pipelines
/// List every published pipeline
pub async fn list_pipelines(State(state): State<AppState>) -> ApiResult<Json<Vec<PipelineSummary>>> {
    tracing::debug!("Listing all pipelines");

    let pipelines = state.gallery.list_all().await?;

    Ok(Json(pipelines))
}

/// GET /pipelines/{account_id}/{pipeline_id}
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path((account_id, pipeline_id)): Path<(String, String)>,
) -> ApiResult<Json<PipelineArtifact>> {
    tracing::debug!("Loading pipeline {} for account {}", pipeline_id, account_id);

    let pipeline = state.gallery.load_by_id(&pipeline_id, &account_id).await?;

    Ok(Json(pipeline))
}
