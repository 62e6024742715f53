//! Record cleaning
//!
//! The service reads a missing optional key as "omitted", while `0` and
//! `false` carry meaning. Cleaning drops null and empty-string values only,
//! recursing into nested objects but not into arrays. It must be the last
//! step before a record goes on the wire.

use mixpanel_domain::Record;
use serde_json::Value;

/// Remove keys whose value is null or an empty string.
pub fn clean_record(record: Record) -> Record {
    record
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(ref s) if s.is_empty() => None,
            Value::Object(nested) => Some((key, Value::Object(clean_record(nested)))),
            other => Some((key, other)),
        })
        .collect()
}

/// [`clean_record`] for an arbitrary value; non-objects pass through.
pub fn clean_value(value: Value) -> Value {
    match value {
        Value::Object(record) => Value::Object(clean_record(record)),
        other => other,
    }
}
