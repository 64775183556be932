//! SQLite-backed collaborators for the signing service

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docstamp_core::{AuditPersistError, AuditSink, BlobStore, BlobStoreError};
use shared_types::{AuditRecord, FieldSummary};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::models::AuditRow;

/// Documents stored as BLOBs in the `documents` table
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, id: &str) -> Result<Vec<u8>, BlobStoreError> {
        let data: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT data FROM documents WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| BlobStoreError::Backend(e.to_string()))?;

        data.ok_or_else(|| BlobStoreError::NotFound(id.to_string()))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobStoreError> {
        let id = Uuid::new_v4().simple().to_string();

        sqlx::query("INSERT INTO documents (id, name, data, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(&bytes)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;

        tracing::debug!(document_id = %id, name, size = bytes.len(), "Stored document");
        Ok(id)
    }
}

/// Audit records in the `audit_records` table
pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records where `document_id` is the source or the result, oldest first
    pub async fn records_for(&self, document_id: &str) -> anyhow::Result<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, source_document_id, result_document_id, source_digest,
                   result_digest, fields_json, created_at
            FROM audit_records
            WHERE source_document_id = ? OR result_document_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(document_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRecord::try_from).collect()
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn insert(&self, record: &AuditRecord) -> Result<(), AuditPersistError> {
        let fields_json = serde_json::to_string(&record.fields_summary)
            .map_err(|e| AuditPersistError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO audit_records (id, source_document_id, result_document_id, source_digest, result_digest, fields_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.source_document_id)
        .bind(&record.result_document_id)
        .bind(&record.source_digest)
        .bind(&record.result_digest)
        .bind(&fields_json)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditPersistError(e.to_string()))?;

        Ok(())
    }
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = anyhow::Error;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let fields_summary: Vec<FieldSummary> = serde_json::from_str(&row.fields_json)?;
        let timestamp = DateTime::parse_from_rfc3339(&row.created_at)?.with_timezone(&Utc);

        Ok(AuditRecord {
            id: row.id,
            source_document_id: row.source_document_id,
            result_document_id: row.result_document_id,
            source_digest: row.source_digest,
            result_digest: row.result_digest,
            fields_summary,
            timestamp,
        })
    }
}
