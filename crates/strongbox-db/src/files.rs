//! Stored-file metadata repository.
//!
//! Backing table:
//!
//! ```sql
//! CREATE TABLE stored_files (
//!     id UUID PRIMARY KEY,
//!     stored_name TEXT NOT NULL UNIQUE,
//!     original_name TEXT NOT NULL,
//!     size BIGINT NOT NULL,
//!     content_type TEXT NOT NULL,
//!     owner_id UUID NOT NULL,
//!     scan_summary TEXT NOT NULL,
//!     uploaded_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX stored_files_owner_idx ON stored_files (owner_id, uploaded_at DESC);
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use strongbox_core::models::StoredFile;
use strongbox_core::AppError;

/// Metadata record store consumed by the upload pipeline.
///
/// Records are insert-once and delete-once; there is no update operation.
#[async_trait]
pub trait FileMetadataStore: Send + Sync {
    /// Insert a new record. Fails if the id already exists.
    async fn insert(&self, record: &StoredFile) -> Result<(), AppError>;

    /// Fetch a record by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, AppError>;

    /// List an owner's records, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<StoredFile>, AppError>;

    /// Count an owner's records.
    async fn count_for_owner(&self, owner_id: Uuid) -> Result<i64, AppError>;

    /// Delete a record by id. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed metadata store
#[derive(Clone)]
pub struct PgFileMetadataStore {
    pool: PgPool,
}

impl PgFileMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileMetadataStore for PgFileMetadataStore {
    async fn insert(&self, record: &StoredFile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO stored_files
                (id, stored_name, original_name, size, content_type, owner_id, scan_summary, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&record.stored_name)
        .bind(&record.original_name)
        .bind(record.size)
        .bind(&record.content_type)
        .bind(record.owner_id)
        .bind(&record.scan_summary)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(file_id = %record.id, "Inserted stored file record");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFile>, AppError> {
        let record: Option<StoredFile> = sqlx::query_as::<Postgres, StoredFile>(
            r#"
            SELECT id, stored_name, original_name, size, content_type, owner_id, scan_summary, uploaded_at
            FROM stored_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<StoredFile>, AppError> {
        let records: Vec<StoredFile> = sqlx::query_as::<Postgres, StoredFile>(
            r#"
            SELECT id, stored_name, original_name, size, content_type, owner_id, scan_summary, uploaded_at
            FROM stored_files
            WHERE owner_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn count_for_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM stored_files WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stored_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
