//! Request and response bodies for the docstamp API

use docstamp_core::{SignOutcome, SkippedField};
use serde::{Deserialize, Serialize};
use shared_types::{AuditRecord, CompositionJob, Field, NormalizedRect};
use sqlx::FromRow;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Response to a PDF upload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub pdf_id: String,
    pub filename: String,
}

/// Body of `POST /sign-pdf`.
///
/// Accepts either `{ sourceDocumentId | pdfId, fields }` or the single
/// signature shape `{ pdfId, signatureBase64, coords }`. When both ids are
/// sent, `sourceDocumentId` wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(default)]
    pub source_document_id: Option<String>,
    #[serde(default)]
    pub pdf_id: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    #[serde(default)]
    pub signature_base64: Option<String>,
    #[serde(default)]
    pub coords: Option<NormalizedRect>,
}

impl SignRequest {
    /// Normalize both accepted shapes into a job.
    ///
    /// A legacy signature is appended after any explicit fields so it draws on top.
    pub fn into_job(self) -> Result<CompositionJob, String> {
        let source_document_id = self
            .source_document_id
            .filter(|id| !id.trim().is_empty())
            .or(self.pdf_id.filter(|id| !id.trim().is_empty()))
            .ok_or_else(|| "Missing sourceDocumentId".to_string())?;

        let mut fields = self.fields.unwrap_or_default();
        match (self.signature_base64, self.coords) {
            (Some(data), Some(rect)) => fields.push(Field::signature("signature", rect, data)),
            (Some(_), None) => return Err("signatureBase64 requires coords".to_string()),
            (None, _) => {}
        }

        Ok(CompositionJob::new(source_document_id, fields))
    }
}

/// Response to a successful compositing request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub result_document_id: String,
    pub result_bytes_base64: String,
    /// Same bytes as `resultBytesBase64`, under the key the editor reads
    pub pdf: String,
    pub source_digest_hex: String,
    pub result_digest_hex: String,
    pub rendered_fields: usize,
    pub skipped_fields: Vec<SkippedField>,
    /// Same id as `resultDocumentId`, under the editor's key
    pub signed_pdf_id: String,
}

impl SignResponse {
    pub fn from_outcome(outcome: SignOutcome, result_bytes_base64: String) -> Self {
        Self {
            signed_pdf_id: outcome.result_document_id.clone(),
            result_document_id: outcome.result_document_id,
            pdf: result_bytes_base64.clone(),
            result_bytes_base64,
            source_digest_hex: outcome.source_digest,
            result_digest_hex: outcome.result_digest,
            rendered_fields: outcome.rendered,
            skipped_fields: outcome.skipped,
        }
    }
}

/// Audit records touching one document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListResponse {
    pub document_id: String,
    pub records: Vec<AuditRecord>,
}

/// Database row for `audit_records`
#[derive(Debug, FromRow)]
pub struct AuditRow {
    pub id: String,
    pub source_document_id: String,
    pub result_document_id: String,
    pub source_digest: String,
    pub result_digest: String,
    pub fields_json: String,
    pub created_at: String,
}
