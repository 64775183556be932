//! Before/after digests for every composed document

use std::sync::Arc;

use shared_types::{AuditRecord, Field};

use crate::store::AuditSink;

/// Builds audit records and forwards them to the sink
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Hash both documents and persist the record.
    ///
    /// Persistence is best effort: a sink failure is logged and the record is
    /// still returned, since the composed document is already final.
    pub async fn record_composition(
        &self,
        source_bytes: &[u8],
        result_bytes: &[u8],
        source_id: &str,
        result_id: &str,
        fields: &[Field],
    ) -> AuditRecord {
        let record = AuditRecord::new(source_id, result_id, source_bytes, result_bytes, fields);

        match self.sink.insert(&record).await {
            Ok(()) => tracing::info!(
                audit_id = %record.id,
                source_document_id = source_id,
                result_document_id = result_id,
                "Recorded composition"
            ),
            Err(e) => tracing::error!(
                audit_id = %record.id,
                source_document_id = source_id,
                error = %e,
                "Audit record not persisted"
            ),
        }

        record
    }
}
