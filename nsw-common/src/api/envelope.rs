//! Response envelope decoding
//!
//! Every backend response is a JSON object carrying a `status` discriminator.
//! `"success"` means the remaining fields are the payload; any other status
//! carries a human-readable `message` that is shown to the reviewer verbatim.
//!
//! The HTTP status code is not consulted: logical failures arrive as 4xx/5xx
//! responses that still carry a valid envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Status value marking a successful response
pub const STATUS_SUCCESS: &str = "success";

/// Decoded envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure { message: String },
}

/// The body could not be interpreted as an envelope
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("response has no status field")]
    MissingStatus,

    #[error("response payload is malformed: {0}")]
    Payload(String),
}

/// Decode a raw response body into an envelope with payload `T`
///
/// Object key order is kept through the intermediate `Value` (serde_json
/// `preserve_order`); attribute readouts depend on it.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, EnvelopeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| EnvelopeError::NotJson(e.to_string()))?;
    decode_envelope_value(value)
}

/// Same as [`decode_envelope`] for an already parsed JSON value
pub fn decode_envelope_value<T: DeserializeOwned>(value: Value) -> Result<Envelope<T>, EnvelopeError> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingStatus)?
        .to_string();

    if status == STATUS_SUCCESS {
        let payload = serde_json::from_value(value).map_err(|e| EnvelopeError::Payload(e.to_string()))?;
        return Ok(Envelope::Success(payload));
    }

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("backend reported status '{}'", status));
    Ok(Envelope::Failure { message })
}
