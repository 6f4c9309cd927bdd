//! Repository Module
//!
//! Data access layer for the server. Repositories talk to the external
//! systems (index table, blob storage, completion backend) and carry no
//! business logic.
//!
//! All repositories are trait-based so services can run against in-memory
//! implementations in tests.

pub mod blob;
pub mod completion;
pub mod mock;
pub mod table;

use thiserror::Error;

// Re-export traits
pub use blob::BlobStore;
pub use completion::CompletionBackend;
pub use table::{TableEntity, TableStore};

// Re-export implementations
pub use blob::{FsBlobStore, MemoryBlobStore};
pub use completion::AzureOpenAiBackend;
pub use mock::MockBackend;
pub use table::{MemoryTableStore, PgTableStore};

/// Error raised by the index table or blob storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob not found: {container}/{path}")]
    BlobNotFound { container: String, path: String },

    #[error("blob already exists: {container}/{path}")]
    BlobExists { container: String, path: String },

    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("malformed entity: {0}")]
    MalformedEntity(String),
}
