//! Service Module
//!
//! Business logic layer for the server.
//! Services coordinate repositories and hold the domain rules.

pub mod gallery;
pub mod generation;
pub mod ingestion;

pub use gallery::{GalleryError, GalleryService};
pub use generation::{GenerationError, GenerationService};
pub use ingestion::{IngestionError, IngestionService, PathEnvironment};
