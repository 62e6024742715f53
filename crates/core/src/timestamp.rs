//! Timestamp normalization between second and millisecond resolution
//!
//! A value below [`MILLISECOND_THRESHOLD`] is read as seconds, anything at or
//! above it as milliseconds.
//!
//! # Known limitation
//! The cutoff is ambiguous at the edges: second-resolution timestamps after
//! the year 2286 and millisecond-resolution timestamps within the first 115
//! days of 1970 are misclassified. The boundary is kept as-is for
//! compatibility with existing callers.

use chrono::{DateTime, Utc};
use mixpanel_domain::constants::MILLISECOND_THRESHOLD;
use mixpanel_domain::{MixpanelError, Result};
use serde_json::Value;

/// Resolution a raw timestamp was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

pub fn classify(value: i64) -> TimestampUnit {
    if value < MILLISECOND_THRESHOLD {
        TimestampUnit::Seconds
    } else {
        TimestampUnit::Milliseconds
    }
}

/// Convert to seconds, flooring millisecond values.
pub fn to_seconds(value: i64) -> i64 {
    match classify(value) {
        TimestampUnit::Seconds => value,
        TimestampUnit::Milliseconds => value.div_euclid(1000),
    }
}

/// Convert to milliseconds.
pub fn to_milliseconds(value: i64) -> i64 {
    match classify(value) {
        TimestampUnit::Seconds => value.saturating_mul(1000),
        TimestampUnit::Milliseconds => value,
    }
}

/// Current time in whole seconds.
pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Parse a caller-supplied timestamp into raw integer form.
///
/// Accepts JSON numbers, numeric strings and RFC 3339 date strings. The
/// result still needs [`to_seconds`] or [`to_milliseconds`]; RFC 3339 input
/// is returned in seconds.
///
/// # Errors
/// Returns `MixpanelError::InvalidPayload` naming `field` for anything else.
pub fn parse(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
            .ok_or_else(|| MixpanelError::invalid_payload(field, "timestamp is out of range")),
        Value::String(raw) => parse_str(field, raw),
        other => Err(MixpanelError::invalid_payload(
            field,
            format!("expected a numeric timestamp, got {other}"),
        )),
    }
}

/// String form of [`parse`].
///
/// # Errors
/// Returns `MixpanelError::InvalidPayload` naming `field` when the string is
/// neither numeric nor an RFC 3339 date.
pub fn parse_str(field: &str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Ok(value.floor() as i64);
        }
    }
    DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(&Utc).timestamp()).map_err(
        |_| MixpanelError::invalid_payload(field, format!("'{raw}' is not a valid timestamp")),
    )
}

/// Parse and convert to seconds in one step.
///
/// # Errors
/// See [`parse`].
pub fn parse_seconds(field: &str, value: &Value) -> Result<i64> {
    parse(field, value).map(to_seconds)
}
