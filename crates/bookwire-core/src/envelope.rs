//! Normalization of the upstream's ad-hoc response envelope.
//!
//! The booking platform does not use HTTP status codes consistently: many
//! errors arrive as HTTP 200 with an embedded `error` object, and the shape
//! of that field varies between endpoints. Everything here decodes into a
//! generic [`Value`] tree first and branches on the observed shape; no fixed
//! schema is assumed for the `error` field, and no branch may panic.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CallError, ErrorCode};

static JSON_NULL: Value = Value::Null;

/// Decodes a raw response body into a JSON tree.
///
/// An absent, blank, `null`, or empty (`{}` / `[]`) body is an
/// `EMPTY_RESPONSE` failure; a body that is not JSON at all is a decode
/// failure, never a crash.
pub fn parse_body(body: &str) -> Result<Value, CallError> {
    if body.trim().is_empty() {
        return Err(CallError::empty_response("no body"));
    }

    let root: Value = serde_json::from_str(body)
        .map_err(|e| CallError::data_parse(format!("response body is not JSON: {e}")))?;

    let is_empty = match &root {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(CallError::empty_response("no body"));
    }

    Ok(root)
}

/// Decides success vs. failure for a parsed body and returns the success
/// payload node.
///
/// - `error` missing entirely: the whole body is the payload.
/// - `error` is an object: a missing `code`, a numeric `0`, an empty string,
///   a `"null"` string, or a JSON null all mean success, and the payload is
///   the `data` sub-field (JSON null when absent). Anything else is a
///   failure carrying the raw code and the upstream message.
/// - `error` has any other shape: failure classified `UNKNOWN`, with the
///   stringified field as the message.
pub fn payload(root: &Value) -> Result<&Value, CallError> {
    let Some(error) = root.get("error") else {
        return Ok(root);
    };

    if !error.is_object() {
        return Err(CallError::unknown(error.to_string()));
    }

    let success = match error.get("code") {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::String(s)) => s.is_empty() || s == "null",
        Some(_) => false,
    };

    if success {
        Ok(root.get("data").unwrap_or(&JSON_NULL))
    } else {
        Err(api_error(error))
    }
}

/// Typed extraction of a payload node into the caller's declared shape.
pub fn decode<T: DeserializeOwned>(node: &Value) -> Result<T, CallError> {
    serde_json::from_value(node.clone()).map_err(|e| CallError::data_parse(e.to_string()))
}

/// Builds the taxonomy failure for an upstream `error` object, preserving the
/// raw code exactly as the upstream sent it.
pub fn api_error(error_node: &Value) -> CallError {
    let raw = match error_node.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let code = ErrorCode::from_raw(&raw);
    let message = error_node
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| code.canonical_message().to_owned());

    CallError::api(code, raw, message)
}

/// Classifies an HTTP error response. A decodable structured `error` body
/// wins over the raw status; otherwise the status itself is the failure.
pub fn classify_http_error(status: u16, body: &str) -> CallError {
    if let Ok(root) = serde_json::from_str::<Value>(body) {
        if let Some(error) = root.get("error") {
            if error.is_object() {
                return api_error(error);
            }
        }
    }
    CallError::http(status, format!("HTTP {status}"))
}
