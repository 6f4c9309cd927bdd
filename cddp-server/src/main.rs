use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

use config::{CompletionProvider, Config, StorageBackend};
use repository::{
    AzureOpenAiBackend, BlobStore, CompletionBackend, FsBlobStore, MemoryBlobStore,
    MemoryTableStore, MockBackend, PgTableStore, TableStore,
};
use service::{GalleryService, GenerationService, IngestionService, PathEnvironment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cddp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CDDP server...");

    let config = Config::from_env().context("Invalid configuration")?;

    let (tables, blobs): (Arc<dyn TableStore>, Arc<dyn BlobStore>) = match &config.storage {
        StorageBackend::Postgres { connection_string } => {
            tracing::info!("Connecting to database...");

            let pool = db::create_pool(connection_string)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            (
                Arc::new(PgTableStore::new(pool)),
                Arc::new(FsBlobStore::new(config.blob_root.clone())),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; published pipelines are lost on restart");
            (Arc::new(MemoryTableStore::new()), Arc::new(MemoryBlobStore::new()))
        }
    };

    let backend: Arc<dyn CompletionBackend> = match &config.completion {
        CompletionProvider::AzureOpenAi(completion) => {
            Arc::new(AzureOpenAiBackend::new(completion.clone()))
        }
        CompletionProvider::Mock => {
            tracing::warn!("Using the mock completion backend; answers are canned");
            Arc::new(MockBackend::new())
        }
    };

    let state = api::AppState {
        generation: GenerationService::new(backend),
        gallery: GalleryService::new(tables, blobs, config.blob_container.clone()),
        ingestion: IngestionService::new(PathEnvironment::from_config(&config)),
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
