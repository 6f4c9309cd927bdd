use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // One relation backs every logical index table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS table_entities (
            table_name VARCHAR(63) NOT NULL,
            partition_key VARCHAR(1024) NOT NULL,
            row_key VARCHAR(1024) NOT NULL,
            properties JSONB NOT NULL DEFAULT '{}',
            updated_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (table_name, partition_key, row_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_table_entities_table ON table_entities(table_name)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
