//! Gallery Service
//!
//! Publishes pipeline artifacts and reads them back. A write touches three
//! places in order: the body blob, the summary index and the full index.
//! Nothing ties them together transactionally; the last writer wins.

use cddp_core::domain::pipeline::{PipelineArtifact, PipelineRecord, PipelineSummary};
use std::sync::Arc;
use thiserror::Error;

use crate::repository::blob::is_path_segment;
use crate::repository::{BlobStore, StorageError, TableEntity, TableStore};

/// Index table holding one full record per pipeline
pub const PIPELINE_TABLE: &str = "pipelines";

/// Index table holding one summary record per pipeline
pub const PIPELINE_INDEX_TABLE: &str = "pipelineindex";

/// Service error type
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("pipeline not found: {0}")]
    NotFound(String),

    #[error("invalid pipeline: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("pipeline {id} is not valid JSON: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pipeline {0} has neither a blob reference nor an inline body")]
    MissingBody(String),
}

pub type Result<T> = std::result::Result<T, GalleryError>;

#[derive(Clone)]
pub struct GalleryService {
    tables: Arc<dyn TableStore>,
    blobs: Arc<dyn BlobStore>,
    container: String,
}

impl GalleryService {
    pub fn new(tables: Arc<dyn TableStore>, blobs: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        Self {
            tables,
            blobs,
            container: container.into(),
        }
    }

    /// Publishes a pipeline under an account
    ///
    /// `publish_date` is always overwritten with the current time. Writing an
    /// id that already exists replaces the blob and both index records.
    pub async fn insert_pipeline(
        &self,
        account_id: &str,
        mut pipeline: PipelineArtifact,
    ) -> Result<PipelineArtifact> {
        validate_pipeline(account_id, &pipeline)?;

        pipeline.stamp(chrono::Utc::now());

        let bytes = serde_json::to_vec(&pipeline).map_err(|source| GalleryError::Serialization {
            id: pipeline.id.clone(),
            source,
        })?;

        let blob_url = self
            .blobs
            .write(&self.container, &pipeline.blob_path(account_id), bytes, true)
            .await?;

        let summary = PipelineSummary::from_artifact(account_id, &pipeline);
        self.tables
            .upsert(PIPELINE_INDEX_TABLE, TableEntity::from_record(&summary)?)
            .await?;

        let record = PipelineRecord::for_blob(account_id, &pipeline, blob_url);
        self.tables
            .upsert(PIPELINE_TABLE, TableEntity::from_record(&record)?)
            .await?;

        tracing::info!(
            "Pipeline published: {} ({}) for account {}",
            pipeline.name,
            pipeline.id,
            account_id
        );

        Ok(pipeline)
    }

    /// Lists every published summary, across all accounts
    pub async fn list_all(&self) -> Result<Vec<PipelineSummary>> {
        let entities = self.tables.list(PIPELINE_INDEX_TABLE).await?;

        let summaries = entities
            .into_iter()
            .map(TableEntity::into_record)
            .collect::<std::result::Result<Vec<PipelineSummary>, _>>()?;

        Ok(summaries)
    }

    /// Loads a pipeline body
    ///
    /// The blob path is derived from the caller's `account_id`, not from the
    /// account stored on the record.
    pub async fn load_by_id(&self, pipeline_id: &str, account_id: &str) -> Result<PipelineArtifact> {
        let record: PipelineRecord = self
            .tables
            .get(PIPELINE_TABLE, pipeline_id, pipeline_id)
            .await?
            .ok_or_else(|| GalleryError::NotFound(pipeline_id.to_string()))?
            .into_record()?;

        let parsed: serde_json::Result<PipelineArtifact> = match (&record.blob_url, &record.body) {
            (Some(_), _) => {
                let path = cddp_core::domain::pipeline::blob_path(account_id, record.id());
                let bytes = self.blobs.read(&self.container, &path).await?;
                serde_json::from_slice(&bytes)
            }
            (None, Some(body)) => {
                tracing::debug!("Pipeline {} has no blob reference, using inline body", pipeline_id);
                serde_json::from_str(body)
            }
            (None, None) => return Err(GalleryError::MissingBody(pipeline_id.to_string())),
        };

        parsed.map_err(|source| GalleryError::Serialization {
            id: pipeline_id.to_string(),
            source,
        })
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_pipeline(account_id: &str, pipeline: &PipelineArtifact) -> Result<()> {
    if account_id.trim().is_empty() {
        return Err(GalleryError::Validation(
            "Account id cannot be empty".to_string(),
        ));
    }

    if !is_path_segment(account_id) {
        return Err(GalleryError::Validation(format!(
            "Account id `{}` is not a valid path segment",
            account_id
        )));
    }

    if pipeline.id.trim().is_empty() {
        return Err(GalleryError::Validation(
            "Pipeline id cannot be empty".to_string(),
        ));
    }

    if !is_path_segment(&pipeline.id) {
        return Err(GalleryError::Validation(format!(
            "Pipeline id `{}` is not a valid path segment",
            pipeline.id
        )));
    }

    if pipeline.name.trim().is_empty() {
        return Err(GalleryError::Validation(
            "Pipeline name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryBlobStore, MemoryTableStore};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixture {
        tables: Arc<MemoryTableStore>,
        blobs: Arc<MemoryBlobStore>,
        service: GalleryService,
    }

    fn fixture() -> Fixture {
        let tables = Arc::new(MemoryTableStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = GalleryService::new(tables.clone(), blobs.clone(), "pipelines");
        Fixture {
            tables,
            blobs,
            service,
        }
    }

    fn pipeline(id: &str, name: &str) -> PipelineArtifact {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "description": format!("{} description", name),
            "industry": "Airline",
            "stages": [
                { "stage": "staging", "tables": ["flights"] },
                { "stage": "standard", "code": "SELECT * FROM flights" }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_then_load_round_trips() {
        let f = fixture();
        let original = pipeline("p-1", "Flight Delays");

        let stored = f.service.insert_pipeline("acct", original.clone()).await.unwrap();
        assert!(stored.publish_date.is_some());

        let loaded = f.service.load_by_id("p-1", "acct").await.unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.body, original.body);
        assert!(f.blobs.contains("pipelines", "acct/p-1.json"));
    }

    #[tokio::test]
    async fn test_publish_date_is_overwritten() {
        let f = fixture();
        let mut p = pipeline("p-1", "Flight Delays");
        p.publish_date = Some("1999-01-01 00:00:00".to_string());

        let stored = f.service.insert_pipeline("acct", p).await.unwrap();
        assert_ne!(stored.publish_date.as_deref(), Some("1999-01-01 00:00:00"));
    }

    #[tokio::test]
    async fn test_writing_same_id_twice_keeps_one_record_each() {
        let f = fixture();
        f.service
            .insert_pipeline("acct", pipeline("p-1", "First"))
            .await
            .unwrap();
        f.service
            .insert_pipeline("acct", pipeline("p-1", "Second"))
            .await
            .unwrap();

        assert_eq!(f.tables.len(PIPELINE_TABLE), 1);
        assert_eq!(f.tables.len(PIPELINE_INDEX_TABLE), 1);

        let summaries = f.service.list_all().await.unwrap();
        assert_eq!(summaries[0].name, "Second");
        assert_eq!(f.service.load_by_id("p-1", "acct").await.unwrap().name, "Second");
    }

    #[tokio::test]
    async fn test_list_all_returns_every_summary() {
        let f = fixture();
        let p1 = f
            .service
            .insert_pipeline("acct-a", pipeline("p-1", "One"))
            .await
            .unwrap();
        let p2 = f
            .service
            .insert_pipeline("acct-b", pipeline("p-2", "Two"))
            .await
            .unwrap();

        let mut summaries = f.service.list_all().await.unwrap();
        summaries.sort_by(|a, b| a.row_key.cmp(&b.row_key));

        assert_eq!(summaries.len(), 2);
        for (summary, (account, stored)) in summaries.iter().zip([("acct-a", &p1), ("acct-b", &p2)]) {
            assert_eq!(summary.id(), stored.id);
            assert_eq!(summary.partition_key, stored.id);
            assert_eq!(summary.name, stored.name);
            assert_eq!(summary.description, stored.description);
            assert_eq!(summary.industry, stored.industry);
            assert_eq!(Some(&summary.publish_date), stored.publish_date.as_ref());
            assert_eq!(summary.account_id, account);
        }
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let f = fixture();
        assert!(f.service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_id() {
        let f = fixture();
        assert!(matches!(
            f.service.load_by_id("missing", "acct").await,
            Err(GalleryError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_missing_blob_is_a_storage_failure() {
        let f = fixture();
        f.service
            .insert_pipeline("acct", pipeline("p-1", "One"))
            .await
            .unwrap();

        // Blob path follows the caller's account, so a different account misses
        let err = f.service.load_by_id("p-1", "other").await.unwrap_err();
        assert!(matches!(
            err,
            GalleryError::Storage(StorageError::BlobNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_inline_body_fallback() {
        let f = fixture();
        let body = serde_json::to_string(&pipeline("legacy", "Legacy")).unwrap();
        let record = PipelineRecord {
            partition_key: "legacy".to_string(),
            row_key: "legacy".to_string(),
            account_id: "acct".to_string(),
            blob_url: None,
            body: Some(body),
        };
        f.tables
            .upsert(PIPELINE_TABLE, TableEntity::from_record(&record).unwrap())
            .await
            .unwrap();

        let loaded = f.service.load_by_id("legacy", "acct").await.unwrap();
        assert_eq!(loaded.name, "Legacy");
    }

    #[tokio::test]
    async fn test_record_without_body() {
        let f = fixture();
        let record = PipelineRecord {
            partition_key: "empty".to_string(),
            row_key: "empty".to_string(),
            account_id: "acct".to_string(),
            blob_url: None,
            body: None,
        };
        f.tables
            .upsert(PIPELINE_TABLE, TableEntity::from_record(&record).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            f.service.load_by_id("empty", "acct").await,
            Err(GalleryError::MissingBody(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_blob() {
        let f = fixture();
        f.service
            .insert_pipeline("acct", pipeline("p-1", "One"))
            .await
            .unwrap();
        f.blobs
            .write("pipelines", "acct/p-1.json", b"not json".to_vec(), true)
            .await
            .unwrap();

        assert!(matches!(
            f.service.load_by_id("p-1", "acct").await,
            Err(GalleryError::Serialization { .. })
        ));
    }

    /// Table store whose writes always fail
    struct BrokenTables;

    #[async_trait]
    impl TableStore for BrokenTables {
        async fn upsert(&self, _: &str, _: TableEntity) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("index offline")))
        }

        async fn get(
            &self,
            _: &str,
            _: &str,
            _: &str,
        ) -> std::result::Result<Option<TableEntity>, StorageError> {
            Ok(None)
        }

        async fn list(&self, _: &str) -> std::result::Result<Vec<TableEntity>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_index_failure_leaves_blob_behind() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = GalleryService::new(Arc::new(BrokenTables), blobs.clone(), "pipelines");

        let err = service
            .insert_pipeline("acct", pipeline("p-1", "One"))
            .await
            .unwrap_err();

        assert!(matches!(err, GalleryError::Storage(_)));
        assert!(blobs.contains("pipelines", "acct/p-1.json"));
    }

    #[tokio::test]
    async fn test_validation() {
        let f = fixture();

        let cases = [
            ("", pipeline("p-1", "One")),
            ("a/b", pipeline("p-1", "One")),
            ("acct", pipeline("", "One")),
            ("acct", pipeline("../p", "One")),
            (".", pipeline("p-1", "One")),
            ("a\\b", pipeline("p-1", "One")),
            ("acct", pipeline("..", "One")),
            ("acct", pipeline(".", "One")),
            ("acct", pipeline("p\\1", "One")),
            ("acct", pipeline("p-1", "  ")),
        ];
        for (account, p) in cases {
            assert!(matches!(
                f.service.insert_pipeline(account, p).await,
                Err(GalleryError::Validation(_))
            ));
        }
        assert_eq!(f.tables.len(PIPELINE_TABLE), 0);
    }

    #[tokio::test]
    async fn test_dots_inside_a_segment_are_allowed() {
        let f = fixture();

        f.service.insert_pipeline("acct", pipeline("v1..2", "Two")).await.unwrap();

        let loaded = f.service.load_by_id("v1..2", "acct").await.unwrap();
        assert_eq!(loaded.name, "Two");
        assert!(f.blobs.contains("pipelines", "acct/v1..2.json"));
    }
}
