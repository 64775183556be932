//! HTTP handlers for the docstamp API

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "docstamp-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Store a raw PDF request body
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let stored = state.service.upload(body.to_vec()).await?;

    Ok(Json(UploadResponse {
        pdf_id: stored.id,
        filename: stored.filename,
    }))
}

/// Stream a stored document back inline
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Vec<u8>), ApiError> {
    let bytes = state.service.fetch(&id).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/pdf".to_string())],
        bytes,
    ))
}

/// Same bytes as [`get_pdf`], as a download
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    let bytes = state.service.fetch(&id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=signed.pdf".to_string(),
            ),
        ],
        bytes,
    ))
}

/// Burn the requested fields into a stored document
pub async fn sign_pdf(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, ApiError> {
    let Json(req) = payload?;
    let job = req.into_job().map_err(ApiError::InvalidRequest)?;

    tracing::info!(
        source_document_id = %job.source_document_id,
        fields = job.fields.len(),
        "Signing request"
    );

    let outcome = state.service.sign(&job).await?;
    let encoded = BASE64.encode(&outcome.bytes);

    Ok(Json(SignResponse::from_outcome(outcome, encoded)))
}

/// Audit trail for a source or result document
pub async fn get_audit(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Json<AuditListResponse>, ApiError> {
    let records = state.audit.records_for(&document_id).await?;

    Ok(Json(AuditListResponse {
        document_id,
        records,
    }))
}
