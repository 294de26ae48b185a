//! `{ success, data, message }` response envelopes.
//!
//! Some endpoints wrap their payload in an envelope, others return it
//! directly. Each endpoint picks its decoder, `parse_direct` or
//! `parse_enveloped`; nothing is inferred from the body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_ENVELOPE_ERROR: &str = "Error en la operación";

/// A response body wrapping the real payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Unwrap an envelope into its payload.
///
/// `data` is returned as-is, `None` included. A falsy or missing `success`
/// is an error carrying the envelope's message, or `default_message`, or
/// "Error en la operación".
pub fn handle_api_response<T>(envelope: Envelope<T>, default_message: Option<&str>) -> Result<Option<T>, ApiError> {
    if envelope.success {
        return Ok(envelope.data);
    }
    let message = envelope
        .message
        .unwrap_or_else(|| default_message.unwrap_or(DEFAULT_ENVELOPE_ERROR).to_string());
    Err(ApiError::normalized(None, message))
}

/// Deserialize an enveloped body and unwrap it. `default_message` is used
/// when a failed envelope carries no message.
pub fn parse_enveloped<T: DeserializeOwned>(body: &str, default_message: &str) -> Result<Option<T>, ApiError> {
    let envelope: Envelope<T> = parse_direct(body)?;
    handle_api_response(envelope, Some(default_message))
}

/// Deserialize a body that is the payload itself.
pub fn parse_direct<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    // Empty 2xx bodies (204 and friends) read as JSON null.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
