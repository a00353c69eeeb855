//! Response envelope validation
//!
//! Every payload from the server carries a `success` marker. Nothing may read
//! a response before it has been through `check_success`.

use super::error::{ApiError, Result};
use crate::utils::connection::Response;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Return the payload of a successful response, or classify the failure
///
/// The marker is judged by truthiness, so `1` or `"yes"` count as success
/// and a missing key counts as failure. The payload is returned untouched.
pub fn check_success(response: Response) -> Result<Map<String, Value>> {
    let Response { payload, status } = response;

    match payload {
        Value::Object(map) if map.get("success").is_some_and(is_truthy) => Ok(map),
        payload => {
            warn!("Server reported failure (code {}): {}", status, payload);
            Err(ApiError::OperationFailed { status, payload })
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Take `key` out of a validated payload and deserialize it
pub(crate) fn take_field<T: DeserializeOwned>(
    payload: &mut Map<String, Value>,
    key: &str,
) -> Result<T> {
    let value = payload
        .remove(key)
        .ok_or_else(|| ApiError::MalformedResponse(format!("missing '{}'", key)))?;

    serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid '{}': {}", key, e)))
}
