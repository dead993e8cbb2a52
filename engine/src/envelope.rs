//! Response envelope decoding.
//!
//! Every backend response is a JSON object of the shape
//! `{ "success": bool, "message"?: string, "<payload-key>": <data> }`.
//! Payloads are decoded into typed records here, at the transport boundary,
//! so malformed data never reaches a store.

use crate::{error::Result, Error};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default message when the backend reports failure without one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Check the `success` flag of an envelope.
///
/// Returns the optional `message` on success.
pub fn ensure_success(body: &Value) -> Result<Option<&str>> {
    let obj = body.as_object().ok_or_else(|| {
        Error::MalformedEnvelope(format!("expected Object, got {}", json_type_name(body)))
    })?;

    let success = match obj.get("success") {
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(Error::MalformedEnvelope(format!(
                "'success' must be Bool, got {}",
                json_type_name(other)
            )))
        }
        None => return Err(Error::MalformedEnvelope("missing 'success' flag".into())),
    };

    let message = obj.get("message").and_then(Value::as_str);

    if success {
        Ok(message)
    } else {
        Err(Error::Application(
            message.unwrap_or(DEFAULT_FAILURE_MESSAGE).to_string(),
        ))
    }
}

/// Decode the payload stored under `key`.
pub fn decode_payload<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T> {
    optional_payload(body, key)?.ok_or_else(|| Error::MissingPayload(key.to_string()))
}

/// Decode the payload under `key` if present.
///
/// Used for confirmations that may carry the updated record or only a
/// status. A missing or null key yields `None`; a present but malformed
/// value is still an error.
pub fn optional_payload<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Option<T>> {
    ensure_success(body)?;

    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| Error::InvalidPayload {
                key: key.to_string(),
                expected: std::any::type_name::<T>()
                    .rsplit("::")
                    .next()
                    .unwrap_or("value")
                    .to_string(),
                got: json_type_name(value).to_string(),
                reason: e.to_string(),
            }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}
