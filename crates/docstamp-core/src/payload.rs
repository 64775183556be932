//! Base64 image payloads as sent by the editor

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::FieldRenderError;

/// Drop a `data:<mime>;base64,` prefix. Everything up to and including the
/// first comma is discarded; base64 itself never contains one.
pub fn strip_data_uri(value: &str) -> &str {
    match value.split_once(',') {
        Some((_, data)) => data,
        None => value,
    }
}

/// Decode an image payload to raw bytes
pub fn decode_payload(value: &str) -> Result<Vec<u8>, FieldRenderError> {
    let data: String = strip_data_uri(value)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if data.is_empty() {
        return Err(FieldRenderError::EmptyPayload);
    }

    STANDARD
        .decode(data.as_bytes())
        .map_err(|e| FieldRenderError::InvalidBase64(e.to_string()))
}
