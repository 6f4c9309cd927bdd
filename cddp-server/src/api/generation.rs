//! Generation API Handlers
//!
//! HTTP endpoints for prompt templates and JSON generation.

use axum::{
    Json,
    extract::{Path, State},
};
use cddp_core::domain::generation::GenerationRequest;
use cddp_core::domain::template::TemplateId;
use cddp_core::dto::generation::{GenerateResponse, TemplateInfo};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /templates
pub async fn list_templates() -> Json<Vec<TemplateInfo>> {
    Json(TemplateId::all().iter().copied().map(TemplateInfo::from).collect())
}

/// POST /generate/{template}
/// Render the template with the request parameters and return the backend's JSON text
pub async fn generate(
    State(state): State<AppState>,
    Path(template): Path<String>,
    Json(req): Json<GenerationRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let template: TemplateId = template
        .parse()
        .map_err(|e: cddp_core::domain::template::UnknownTemplate| ApiError::NotFound(e.to_string()))?;

    tracing::info!("Generating {} with {} parameters", template, req.len());

    let text = state.generation.generate(template, &req).await?;

    Ok(Json(GenerateResponse { template, text }))
}
