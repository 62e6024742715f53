//! Export response decoding
//!
//! The export endpoint streams newline-delimited JSON, but proxies and older
//! API versions also hand back a JSON array or a single object.

use mixpanel_domain::{MixpanelError, Result};
use serde_json::Value;

/// Normalize an export body into one value per exported record.
///
/// - string: split on newlines, skip blank lines, parse each line
/// - array: passed through unchanged
/// - object: wrapped as a single record
/// - null: no records
///
/// # Errors
/// Returns `MixpanelError::Protocol` when a line fails to parse (the whole
/// export fails; there is no partial-line recovery) or the body is another
/// scalar.
pub fn normalize_export(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::String(text) => decode_lines(&text),
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![body]),
        Value::Null => Ok(Vec::new()),
        other => Err(MixpanelError::Protocol(format!("unexpected export body: {other}"))),
    }
}

/// Normalize a raw response body.
///
/// A body that parses as a whole JSON array or object is handled as such;
/// everything else is treated as newline-delimited JSON.
///
/// # Errors
/// See [`normalize_export`].
pub fn normalize_export_text(body: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => normalize_export(value),
        _ => decode_lines(body),
    }
}

fn decode_lines(text: &str) -> Result<Vec<Value>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|err| {
                MixpanelError::Protocol(format!(
                    "export line {} is not valid JSON: {err}",
                    number + 1
                ))
            })
        })
        .collect()
}
