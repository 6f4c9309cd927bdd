//! Blob Repository
//!
//! Byte blobs addressed by container plus a caller-chosen path. Nothing is
//! content-addressed: the same path always names the same blob.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use super::StorageError;

/// Repository trait for blob storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes a blob and returns its URL
    ///
    /// With `overwrite` unset, writing to an existing path fails with
    /// [`StorageError::BlobExists`].
    async fn write(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, StorageError>;

    /// Reads a whole blob
    async fn read(&self, container: &str, path: &str) -> Result<Vec<u8>, StorageError>;
}

/// True when `value` is exactly one plain path component
pub fn is_path_segment(value: &str) -> bool {
    !value.contains(['/', '\\'])
        && matches!(
            Path::new(value).components().collect::<Vec<_>>().as_slice(),
            [Component::Normal(_)]
        )
}

/// Rejects paths that would escape the container
fn check_relative(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.contains('\\')
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

    if invalid {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn not_found(container: &str, path: &str) -> StorageError {
    StorageError::BlobNotFound {
        container: container.to_string(),
        path: path.to_string(),
    }
}

// =============================================================================
// File system
// =============================================================================

/// File-system implementation of BlobStore
///
/// Containers are directories under `root`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, container: &str, path: &str) -> Result<PathBuf, StorageError> {
        check_relative(container)?;
        check_relative(path)?;
        Ok(self.root.join(container).join(path))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, StorageError> {
        let full_path = self.resolve(container, path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if overwrite {
            tokio::fs::write(&full_path, &bytes).await?;
        } else {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => StorageError::BlobExists {
                        container: container.to_string(),
                        path: path.to_string(),
                    },
                    _ => StorageError::Io(e),
                })?;
            file.write_all(&bytes).await?;
            file.flush().await?;
        }

        tracing::debug!("Wrote {} bytes to blob {}/{}", bytes.len(), container, path);

        let absolute = std::path::absolute(&full_path).unwrap_or(full_path);
        Ok(format!("file://{}", absolute.display()))
    }

    async fn read(&self, container: &str, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(container, path)?;

        tokio::fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(container, path),
            _ => StorageError::Io(e),
        })
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// In-memory implementation of BlobStore
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, container: &str, path: &str) -> bool {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.contains_key(&(container.to_string(), path.to_string()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<String, StorageError> {
        check_relative(container)?;
        check_relative(path)?;

        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        let key = (container.to_string(), path.to_string());
        if !overwrite && blobs.contains_key(&key) {
            return Err(StorageError::BlobExists {
                container: key.0,
                path: key.1,
            });
        }
        blobs.insert(key, bytes);

        Ok(format!("memory://{}/{}", container, path))
    }

    async fn read(&self, container: &str, path: &str) -> Result<Vec<u8>, StorageError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(&(container.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| not_found(container, path))
    }
}
