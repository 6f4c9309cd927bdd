//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod generation;
pub mod health;
pub mod ingestion;
pub mod pipeline;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::{GalleryService, GenerationService, IngestionService};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
    pub gallery: GalleryService,
    pub ingestion: IngestionService,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Generation endpoints
        .route("/templates", get(generation::list_templates))
        .route("/generate/{template}", post(generation::generate))
        // Gallery endpoints
        .route("/pipelines", get(pipeline::list_pipelines))
        .route("/pipelines/{account_id}", post(pipeline::insert_pipeline))
        .route(
            "/pipelines/{account_id}/{pipeline_id}",
            get(pipeline::get_pipeline),
        )
        // Ingestion endpoints
        .route("/ingestion/plan", post(ingestion::plan_ingestion))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
