//! Event payload builders

use mixpanel_domain::constants::{PROP_DISTINCT_ID, PROP_INSERT_ID, PROP_IP, PROP_TIME, PROP_TOKEN};
use mixpanel_domain::{EventRecord, MixpanelError, Record, Result};
use serde_json::Value;

use super::clean::clean_record;
use crate::timestamp;

/// Optional fields for [`build_event_properties`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOptions {
    /// Explicit event time in seconds or milliseconds; normalized to seconds.
    pub time: Option<i64>,
    pub ip: Option<String>,
}

impl EventOptions {
    pub fn with_time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

/// Shape the `properties` object of an event.
///
/// `time` defaults to the current second. Caller properties are merged on
/// top (a `time` property wins over the default and is normalized to
/// seconds), an explicit [`EventOptions::time`] wins over both, and `token`,
/// `distinct_id` and `$insert_id` are always the synthesized values.
///
/// # Errors
/// Returns `MixpanelError::InvalidPayload` when a `time` property is not a
/// valid timestamp.
pub fn build_event_properties(
    token: &str,
    distinct_id: &str,
    insert_id: &str,
    extra: &Record,
    options: &EventOptions,
) -> Result<Record> {
    let mut properties = Record::new();
    for (key, value) in extra {
        properties.insert(key.clone(), value.clone());
    }

    if let Some(raw) = properties.get(PROP_TIME).filter(|value| !value.is_null()) {
        let seconds = timestamp::parse_seconds("properties.time", raw)?;
        properties.insert(PROP_TIME.into(), Value::from(seconds));
    } else {
        properties.insert(PROP_TIME.into(), Value::from(timestamp::now_seconds()));
    }

    if let Some(time) = options.time {
        properties.insert(PROP_TIME.into(), Value::from(timestamp::to_seconds(time)));
    }

    properties.insert(PROP_TOKEN.into(), Value::from(token));
    properties.insert(PROP_DISTINCT_ID.into(), Value::from(distinct_id));
    properties.insert(PROP_INSERT_ID.into(), Value::from(insert_id));

    if let Some(ip) = &options.ip {
        properties.insert(PROP_IP.into(), Value::from(ip.as_str()));
    }

    Ok(clean_record(properties))
}

/// Build a complete event record after checking the required fields.
///
/// # Errors
/// Returns `MixpanelError::InvalidInput` for a blank event name or distinct
/// id, and propagates errors from [`build_event_properties`].
pub fn build_event(
    event: &str,
    token: &str,
    distinct_id: &str,
    insert_id: &str,
    extra: &Record,
    options: &EventOptions,
) -> Result<EventRecord> {
    if event.trim().is_empty() {
        return Err(MixpanelError::InvalidInput("event name is required".into()));
    }
    if distinct_id.trim().is_empty() {
        return Err(MixpanelError::InvalidInput("distinct id is required".into()));
    }
    let properties = build_event_properties(token, distinct_id, insert_id, extra, options)?;
    Ok(EventRecord::new(event, properties))
}
