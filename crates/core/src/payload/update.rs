//! Profile and group update builders
//!
//! Both envelopes carry exactly one operation keyword; the builders take the
//! keyword as a single parameter so a second one cannot slip in.

use mixpanel_domain::constants::{
    ENVELOPE_DISTINCT_ID, ENVELOPE_GROUP_ID, ENVELOPE_GROUP_KEY, ENVELOPE_IGNORE_TIME, ENVELOPE_IP,
    ENVELOPE_TOKEN,
};
use mixpanel_domain::{MixpanelError, Record, Result, UpdateOperation};
use serde_json::Value;

use super::clean::clean_record;

/// Payload sent with `$delete`; a literal string so record cleaning keeps it.
pub const DELETE_PAYLOAD: &str = "null";

/// Optional envelope flags for profile updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileOptions {
    pub ip: Option<String>,
    pub ignore_time: Option<bool>,
}

impl ProfileOptions {
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_ignore_time(mut self, ignore_time: bool) -> Self {
        self.ignore_time = Some(ignore_time);
        self
    }
}

/// Build `{"$token", "$distinct_id", <operation>: payload}` plus optional flags.
///
/// # Errors
/// Returns `MixpanelError::InvalidInput` for a blank distinct id and
/// `MixpanelError::InvalidPayload` when the payload shape does not fit the
/// operation.
pub fn build_profile_update(
    token: &str,
    distinct_id: &str,
    operation: UpdateOperation,
    payload: Value,
    options: &ProfileOptions,
) -> Result<Record> {
    if distinct_id.trim().is_empty() {
        return Err(MixpanelError::InvalidInput("distinct id is required".into()));
    }
    let payload = check_payload(operation, payload)?;

    let mut record = Record::new();
    record.insert(ENVELOPE_TOKEN.into(), Value::from(token));
    record.insert(ENVELOPE_DISTINCT_ID.into(), Value::from(distinct_id));
    record.insert(operation.as_str().into(), payload);
    if let Some(ip) = &options.ip {
        record.insert(ENVELOPE_IP.into(), Value::from(ip.as_str()));
    }
    if let Some(ignore_time) = options.ignore_time {
        record.insert(ENVELOPE_IGNORE_TIME.into(), Value::Bool(ignore_time));
    }
    Ok(clean_record(record))
}

/// Build `{"$token", "$group_key", "$group_id", <operation>: payload}`.
///
/// # Errors
/// Returns `MixpanelError::InvalidInput` for a blank group key or id, or for
/// an operation the groups endpoint does not accept, and
/// `MixpanelError::InvalidPayload` for a payload of the wrong shape.
pub fn build_group_update(
    token: &str,
    group_key: &str,
    group_id: &str,
    operation: UpdateOperation,
    payload: Value,
) -> Result<Record> {
    if group_key.trim().is_empty() {
        return Err(MixpanelError::InvalidInput("group key is required".into()));
    }
    if group_id.trim().is_empty() {
        return Err(MixpanelError::InvalidInput("group id is required".into()));
    }
    if !UpdateOperation::GROUP.contains(&operation) {
        return Err(MixpanelError::InvalidInput(format!(
            "operation {operation} is not supported for group profiles"
        )));
    }
    let payload = check_payload(operation, payload)?;

    let mut record = Record::new();
    record.insert(ENVELOPE_TOKEN.into(), Value::from(token));
    record.insert(ENVELOPE_GROUP_KEY.into(), Value::from(group_key));
    record.insert(ENVELOPE_GROUP_ID.into(), Value::from(group_id));
    record.insert(operation.as_str().into(), payload);
    Ok(clean_record(record))
}

fn check_payload(operation: UpdateOperation, payload: Value) -> Result<Value> {
    let field = operation.as_str();
    match operation {
        UpdateOperation::Delete => Ok(Value::from(DELETE_PAYLOAD)),
        UpdateOperation::Unset => match payload {
            Value::Array(names) if names.iter().all(Value::is_string) => Ok(Value::Array(names)),
            _ => Err(MixpanelError::invalid_payload(field, "expected an array of property names")),
        },
        UpdateOperation::Add => {
            let map = expect_object(field, payload)?;
            if let Some((key, _)) = map.iter().find(|(_, value)| !value.is_number()) {
                return Err(MixpanelError::invalid_payload(
                    field,
                    format!("value for '{key}' must be numeric"),
                ));
            }
            Ok(Value::Object(map))
        }
        UpdateOperation::Union => {
            let map = expect_object(field, payload)?;
            if let Some((key, _)) = map.iter().find(|(_, value)| !value.is_array()) {
                return Err(MixpanelError::invalid_payload(
                    field,
                    format!("value for '{key}' must be a list"),
                ));
            }
            Ok(Value::Object(map))
        }
        UpdateOperation::Set
        | UpdateOperation::SetOnce
        | UpdateOperation::Append
        | UpdateOperation::Remove => expect_object(field, payload).map(Value::Object),
    }
}

fn expect_object(field: &str, payload: Value) -> Result<Record> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(MixpanelError::invalid_payload(
            field,
            format!("expected an object of property values, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn profile_set_envelope() {
        let record = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::Set,
            json!({"name": "John"}),
            &ProfileOptions::default(),
        )
        .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"$token": "tok", "$distinct_id": "u1", "$set": {"name": "John"}})
        );
    }

    #[test]
    fn profile_flags_are_added_only_when_present() {
        let record = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::Set,
            json!({"name": "John"}),
            &ProfileOptions::default().with_ip("1.2.3.4").with_ignore_time(true),
        )
        .unwrap();
        assert_eq!(record["$ip"], "1.2.3.4");
        assert_eq!(record["$ignore_time"], true);
    }

    #[test]
    fn ignore_time_false_survives_cleaning() {
        let record = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::SetOnce,
            json!({"first_seen": 0}),
            &ProfileOptions::default().with_ignore_time(false),
        )
        .unwrap();
        assert_eq!(record["$ignore_time"], false);
        assert_eq!(record["$set_once"], json!({"first_seen": 0}));
    }

    #[test]
    fn unset_requires_property_names() {
        let ok = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::Unset,
            json!(["plan"]),
            &ProfileOptions::default(),
        )
        .unwrap();
        assert_eq!(ok["$unset"], json!(["plan"]));

        let err = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::Unset,
            json!({"plan": 1}),
            &ProfileOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidPayload { ref field, .. } if field == "$unset"));
    }

    #[test]
    fn add_requires_numbers_and_union_requires_lists() {
        let options = ProfileOptions::default();
        assert!(build_profile_update("t", "u", UpdateOperation::Add, json!({"n": 2}), &options)
            .is_ok());
        assert!(build_profile_update("t", "u", UpdateOperation::Add, json!({"n": "2"}), &options)
            .is_err());
        assert!(build_profile_update(
            "t",
            "u",
            UpdateOperation::Union,
            json!({"tags": ["a"]}),
            &options
        )
        .is_ok());
        assert!(build_profile_update("t", "u", UpdateOperation::Union, json!({"tags": "a"}), &options)
            .is_err());
    }

    #[test]
    fn delete_ignores_payload() {
        let record = build_profile_update(
            "tok",
            "u1",
            UpdateOperation::Delete,
            Value::Null,
            &ProfileOptions::default(),
        )
        .unwrap();
        assert_eq!(record["$delete"], DELETE_PAYLOAD);
    }

    #[test]
    fn group_envelope_is_scoped_by_key_and_id() {
        let record =
            build_group_update("tok", "company", "acme", UpdateOperation::Set, json!({"tier": "gold"}))
                .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({
                "$token": "tok",
                "$group_key": "company",
                "$group_id": "acme",
                "$set": {"tier": "gold"}
            })
        );
    }

    #[test]
    fn group_rejects_profile_only_operations() {
        let err = build_group_update("tok", "company", "acme", UpdateOperation::Add, json!({"n": 1}))
            .unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidInput(_)));
        assert!(build_group_update("tok", "", "acme", UpdateOperation::Set, json!({})).is_err());
    }
}
