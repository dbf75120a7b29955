//! Base64 payloads and data URIs

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to a bare base64 payload
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a base64 payload, accepting either a bare payload or a full data URI
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(strip_data_uri_prefix(encoded).trim())
        .map_err(|e| AppError::InvalidBase64(e.to_string()))
}

/// Drop a `data:<mime>;base64,` header if present
pub fn strip_data_uri_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once(',').map(|(_, payload)| payload).unwrap_or(data)
    } else {
        data
    }
}

/// Build a displayable data URI around an already-encoded payload
pub fn data_uri(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}
