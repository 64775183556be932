//! Error types for the docstamp API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docstamp_core::DocstampError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Signing(#[from] DocstampError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    status: u16,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Signing(DocstampError::InvalidJobInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Signing(DocstampError::SourceNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Signing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "InvalidJobInput",
            ApiError::Signing(e) => e.kind(),
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let message = if status.is_server_error() {
            tracing::error!(code, "Request failed: {}", self);
            match &self {
                ApiError::Signing(DocstampError::Compose(_)) => "Error signing PDF".to_string(),
                ApiError::Signing(_) => "Error accessing document storage".to_string(),
                ApiError::Internal(_) | ApiError::InvalidRequest(_) => {
                    "Internal error".to_string()
                }
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: message,
            code,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}
