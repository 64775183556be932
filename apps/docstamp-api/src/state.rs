//! Application state for the docstamp API

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use docstamp_core::SigningService;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::storage::{SqliteAuditSink, SqliteBlobStore};

pub struct AppState {
    pub service: SigningService,
    pub audit: Arc<SqliteAuditSink>,
}

impl AppState {
    /// Open the pool, run migrations and wire the signing service
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        run_migrations(&pool).await?;

        let blobs = Arc::new(SqliteBlobStore::new(pool.clone()));
        let audit = Arc::new(SqliteAuditSink::new(pool.clone()));
        let service = SigningService::new(blobs, audit.clone());

        Ok(Self { service, audit })
    }
}

/// `sqlite:` URL for a database file under the platform data directory
pub fn default_database_url() -> Result<String> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docstamp-api");
    std::fs::create_dir_all(&data_dir)?;
    Ok(format!("sqlite:{}/docstamp.db?mode=rwc", data_dir.display()))
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            data BLOB NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_records (
            id TEXT PRIMARY KEY,
            source_document_id TEXT NOT NULL,
            result_document_id TEXT NOT NULL,
            source_digest TEXT NOT NULL,
            result_digest TEXT NOT NULL,
            fields_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Audit lookups go by either side of the composition
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_audit_source ON audit_records(source_document_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_audit_result ON audit_records(result_document_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete");
    Ok(())
}

/// Per-user data directory on the platforms the server is deployed to
mod dirs {
    use std::env;
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        let home = || env::var_os("HOME").map(PathBuf::from);

        if cfg!(target_os = "macos") {
            home().map(|h| h.join("Library/Application Support"))
        } else {
            env::var_os("XDG_DATA_HOME")
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".local/share")))
        }
    }
}
