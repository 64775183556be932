//! Request orchestration: fetch, compose, store, audit

use std::sync::Arc;

use chrono::Utc;
use shared_types::CompositionJob;

use crate::audit::AuditRecorder;
use crate::compose::{Compositor, SkippedField};
use crate::error::{BlobStoreError, DocstampError};
use crate::store::{AuditSink, BlobStore};

/// What a successful signing request produced
#[derive(Debug, Clone)]
pub struct SignOutcome {
    pub result_document_id: String,
    pub bytes: Vec<u8>,
    pub source_digest: String,
    pub result_digest: String,
    pub rendered: usize,
    pub skipped: Vec<SkippedField>,
}

/// A freshly stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub filename: String,
}

/// Collaborators are injected once; the service holds no per-request state.
#[derive(Clone)]
pub struct SigningService {
    blobs: Arc<dyn BlobStore>,
    recorder: AuditRecorder,
    compositor: Compositor,
}

impl SigningService {
    pub fn new(blobs: Arc<dyn BlobStore>, audit_sink: Arc<dyn AuditSink>) -> Self {
        Self {
            blobs,
            recorder: AuditRecorder::new(audit_sink),
            compositor: Compositor::new(),
        }
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Store an uploaded source document as `pdf_<millis>.pdf`
    pub async fn upload(&self, bytes: Vec<u8>) -> Result<StoredDocument, DocstampError> {
        if bytes.is_empty() {
            return Err(DocstampError::InvalidJobInput(
                "No PDF data received".to_string(),
            ));
        }

        let filename = format!("pdf_{}.pdf", Utc::now().timestamp_millis());
        let id = self
            .blobs
            .put(&filename, bytes)
            .await
            .map_err(|e| DocstampError::StoreWrite(e.to_string()))?;

        tracing::info!(document_id = %id, filename = %filename, "Stored upload");
        Ok(StoredDocument { id, filename })
    }

    /// Read a stored document
    pub async fn fetch(&self, id: &str) -> Result<Vec<u8>, DocstampError> {
        self.blobs.get(id).await.map_err(|e| match e {
            BlobStoreError::NotFound(id) => DocstampError::SourceNotFound(id),
            BlobStoreError::Backend(msg) => DocstampError::SourceRead(msg),
        })
    }

    /// Compose `job` over its source document and store the result
    pub async fn sign(&self, job: &CompositionJob) -> Result<SignOutcome, DocstampError> {
        let source_id = job.source_document_id.trim();
        if source_id.is_empty() {
            return Err(DocstampError::InvalidJobInput(
                "Missing source document id".to_string(),
            ));
        }

        let source = self.fetch(source_id).await?;
        let composition = self.compositor.compose(&source, &job.fields)?;

        let result_name = format!("signed_{}.pdf", source_id);
        let result_document_id = self
            .blobs
            .put(&result_name, composition.bytes.clone())
            .await
            .map_err(|e| DocstampError::StoreWrite(e.to_string()))?;

        let record = self
            .recorder
            .record_composition(
                &source,
                &composition.bytes,
                source_id,
                &result_document_id,
                &job.fields,
            )
            .await;

        tracing::info!(
            source_document_id = source_id,
            result_document_id = %result_document_id,
            rendered = composition.rendered,
            skipped = composition.skipped.len(),
            "Signed document"
        );

        Ok(SignOutcome {
            result_document_id,
            bytes: composition.bytes,
            source_digest: record.source_digest,
            result_digest: record.result_digest,
            rendered: composition.rendered,
            skipped: composition.skipped,
        })
    }
}
