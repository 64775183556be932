//! Provenance records for composed documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::Field;

/// The part of a field that is worth keeping in the audit trail.
///
/// Payloads (signature images, typed text) are deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub page_index: i64,
}

impl From<&Field> for FieldSummary {
    fn from(field: &Field) -> Self {
        Self {
            id: field.id.clone(),
            field_type: field.type_name().to_string(),
            page_index: field.rect.page_index,
        }
    }
}

/// One audit entry per successful composition. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    pub source_document_id: String,
    pub result_document_id: String,
    /// SHA-256 of the source bytes, lowercase hex
    pub source_digest: String,
    /// SHA-256 of the composed bytes, lowercase hex
    pub result_digest: String,
    pub fields_summary: Vec<FieldSummary>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record for a composition, hashing both documents
    pub fn new(
        source_document_id: &str,
        result_document_id: &str,
        source_bytes: &[u8],
        result_bytes: &[u8],
        fields: &[Field],
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_document_id: source_document_id.to_string(),
            result_document_id: result_document_id.to_string(),
            source_digest: hash_document(source_bytes),
            result_digest: hash_document(result_bytes),
            fields_summary: fields.iter().map(FieldSummary::from).collect(),
            timestamp: Utc::now(),
        }
    }

    /// Whether this record mentions `document_id` as source or result
    pub fn involves(&self, document_id: &str) -> bool {
        self.source_document_id == document_id || self.result_document_id == document_id
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize audit record: {}", e))
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to deserialize audit record: {}", e))
    }
}

/// Compute SHA-256 hash of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
