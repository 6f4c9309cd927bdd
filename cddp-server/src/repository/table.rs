//! Table Repository
//!
//! Key-value index store. Rows are addressed by table name plus a
//! `(partition_key, row_key)` pair and carry a JSON property bag. Upsert
//! replaces the whole bag; there is no partial merge.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::StorageError;

/// One row of an index table
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    pub partition_key: String,
    pub row_key: String,
    pub properties: Map<String, Value>,
}

impl TableEntity {
    /// Builds an entity from a record with `partition_key` and `row_key` fields
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StorageError> {
        let mut properties = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(StorageError::MalformedEntity(
                    "record must serialize to a JSON object".to_string(),
                ));
            }
            Err(e) => return Err(StorageError::MalformedEntity(e.to_string())),
        };

        let partition_key = take_key(&mut properties, "partition_key")?;
        let row_key = take_key(&mut properties, "row_key")?;

        Ok(Self {
            partition_key,
            row_key,
            properties,
        })
    }

    /// Reads the entity back into a typed record
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, StorageError> {
        let mut map = self.properties;
        map.insert("partition_key".to_string(), Value::String(self.partition_key));
        map.insert("row_key".to_string(), Value::String(self.row_key));

        serde_json::from_value(Value::Object(map))
            .map_err(|e| StorageError::MalformedEntity(e.to_string()))
    }
}

fn take_key(properties: &mut Map<String, Value>, key: &str) -> Result<String, StorageError> {
    match properties.remove(key) {
        Some(Value::String(value)) => Ok(value),
        _ => Err(StorageError::MalformedEntity(format!(
            "record has no string `{}`",
            key
        ))),
    }
}

/// Repository trait for index tables
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Creates the row, or fully replaces it if the key already exists
    async fn upsert(&self, table: &str, entity: TableEntity) -> Result<(), StorageError>;

    /// Looks up a single row
    async fn get(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, StorageError>;

    /// Lists every row of the table, in no particular order
    async fn list(&self, table: &str) -> Result<Vec<TableEntity>, StorageError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// PostgreSQL implementation of TableStore
///
/// All logical tables share the `table_entities` relation created by
/// [`crate::db::run_migrations`].
#[derive(Debug, Clone)]
pub struct PgTableStore {
    pool: PgPool,
}

impl PgTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableStore for PgTableStore {
    async fn upsert(&self, table: &str, entity: TableEntity) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO table_entities (table_name, partition_key, row_key, properties, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (table_name, partition_key, row_key)
            DO UPDATE SET properties = EXCLUDED.properties, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(table)
        .bind(&entity.partition_key)
        .bind(&entity.row_key)
        .bind(Value::Object(entity.properties))
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, StorageError> {
        let row = sqlx::query_as::<_, EntityRow>(
            r#"
            SELECT partition_key, row_key, properties
            FROM table_entities
            WHERE table_name = $1 AND partition_key = $2 AND row_key = $3
            "#,
        )
        .bind(table)
        .bind(partition_key)
        .bind(row_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TableEntity::try_from).transpose()
    }

    async fn list(&self, table: &str) -> Result<Vec<TableEntity>, StorageError> {
        let rows = sqlx::query_as::<_, EntityRow>(
            r#"
            SELECT partition_key, row_key, properties
            FROM table_entities
            WHERE table_name = $1
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TableEntity::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct EntityRow {
    partition_key: String,
    row_key: String,
    properties: Value,
}

impl TryFrom<EntityRow> for TableEntity {
    type Error = StorageError;

    fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
        match row.properties {
            Value::Object(properties) => Ok(TableEntity {
                partition_key: row.partition_key,
                row_key: row.row_key,
                properties,
            }),
            other => Err(StorageError::MalformedEntity(format!(
                "properties of {}/{} are not an object: {}",
                row.partition_key, row.row_key, other
            ))),
        }
    }
}

// =============================================================================
// In-memory
// =============================================================================

type Rows = BTreeMap<(String, String), Map<String, Value>>;

/// In-memory implementation of TableStore
///
/// Used by tests and by `STORAGE_BACKEND=memory` for local runs.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: Mutex<HashMap<String, Rows>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`
    pub fn len(&self, table: &str) -> usize {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.get(table).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn upsert(&self, table: &str, entity: TableEntity) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.entry(table.to_string()).or_default().insert(
            (entity.partition_key, entity.row_key),
            entity.properties,
        );
        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, StorageError> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let key = (partition_key.to_string(), row_key.to_string());

        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(&key))
            .map(|properties| TableEntity {
                partition_key: key.0.clone(),
                row_key: key.1.clone(),
                properties: properties.clone(),
            }))
    }

    async fn list(&self, table: &str) -> Result<Vec<TableEntity>, StorageError> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());

        Ok(tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|((partition_key, row_key), properties)| TableEntity {
                        partition_key: partition_key.clone(),
                        row_key: row_key.clone(),
                        properties: properties.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        partition_key: String,
        row_key: String,
        colour: String,
    }

    fn entity(key: &str, colour: &str) -> TableEntity {
        TableEntity::from_record(&Record {
            partition_key: key.to_string(),
            row_key: key.to_string(),
            colour: colour.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_entity_splits_keys_from_properties() {
        let entity = entity("k", "red");
        assert_eq!(entity.partition_key, "k");
        assert_eq!(entity.row_key, "k");
        assert_eq!(Value::Object(entity.properties.clone()), json!({ "colour": "red" }));

        let record: Record = entity.into_record().unwrap();
        assert_eq!(record.colour, "red");
    }

    #[test]
    fn test_record_without_keys_is_rejected() {
        let err = TableEntity::from_record(&json!({ "colour": "red" })).unwrap_err();
        assert!(matches!(err, StorageError::MalformedEntity(_)));

        let err = TableEntity::from_record(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, StorageError::MalformedEntity(_)));
    }

    #[tokio::test]
    async fn test_memory_upsert_replaces_whole_row() {
        let store = MemoryTableStore::new();
        store.upsert("t", entity("a", "red")).await.unwrap();

        let mut replacement = entity("a", "blue");
        replacement.properties.remove("colour");
        replacement
            .properties
            .insert("shape".to_string(), json!("round"));
        store.upsert("t", replacement).await.unwrap();

        assert_eq!(store.len("t"), 1);
        let row = store.get("t", "a", "a").await.unwrap().unwrap();
        assert_eq!(Value::Object(row.properties), json!({ "shape": "round" }));
    }

    #[tokio::test]
    async fn test_memory_tables_are_independent() {
        let store = MemoryTableStore::new();
        store.upsert("one", entity("a", "red")).await.unwrap();
        store.upsert("two", entity("b", "blue")).await.unwrap();

        assert_eq!(store.list("one").await.unwrap().len(), 1);
        assert!(store.get("one", "b", "b").await.unwrap().is_none());
        assert!(store.list("missing").await.unwrap().is_empty());
    }
}
