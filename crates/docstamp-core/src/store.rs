//! Storage collaborators
//!
//! The core never talks to a database directly. Hosts hand the
//! [`crate::SigningService`] implementations of these traits; the in-memory
//! versions here back tests and embedders without persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use shared_types::AuditRecord;
use uuid::Uuid;

use crate::error::{AuditPersistError, BlobStoreError};

/// Document storage addressed by opaque ids
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a document to completion
    async fn get(&self, id: &str) -> Result<Vec<u8>, BlobStoreError>;

    /// Store a new document under a display name and return its id
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobStoreError>;
}

/// Destination for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn insert(&self, record: &AuditRecord) -> Result<(), AuditPersistError>;
}

#[derive(Debug, Clone)]
struct StoredBlob {
    name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name a blob was stored under
    pub fn name_of(&self, id: &str) -> Option<String> {
        self.blobs
            .read()
            .ok()
            .and_then(|blobs| blobs.get(id).map(|blob| blob.name.clone()))
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, id: &str) -> Result<Vec<u8>, BlobStoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        blobs
            .get(id)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| BlobStoreError::NotFound(id.to_string()))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobStoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        blobs.insert(
            id.clone(),
            StoredBlob {
                name: name.to_string(),
                bytes,
            },
        );
        Ok(id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn insert(&self, record: &AuditRecord) -> Result<(), AuditPersistError> {
        self.records
            .write()
            .map_err(|e| AuditPersistError(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}
