//! Typed access to raw operation parameters
//!
//! Hosts hand parameters over as a JSON object whose values may be native
//! JSON or JSON encoded in strings (form fields). Accessors validate before
//! any network call happens.

use mixpanel_domain::{MixpanelError, Record, Result};
use serde_json::Value;

/// Raw parameters for one operation invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationParams {
    values: Record,
}

impl OperationParams {
    pub fn new(values: Record) -> Self {
        Self { values }
    }

    /// Build from any JSON value; non-objects yield empty parameters.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Raw value, treating null as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Required non-blank string; numbers are accepted and stringified.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidInput` when missing or blank.
    pub fn required_str(&self, name: &str) -> Result<String> {
        self.optional_str(name)?
            .ok_or_else(|| MixpanelError::InvalidInput(format!("parameter '{name}' is required")))
    }

    /// Optional string; blank strings count as absent.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidInput` when present but not a string or
    /// number.
    pub fn optional_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(MixpanelError::InvalidInput(format!(
                "parameter '{name}' must be a string, got {other}"
            ))),
        }
    }

    /// Optional boolean; accepts `true`/`false` strings.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidInput` for any other value.
    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "" => Ok(None),
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(MixpanelError::InvalidInput(format!(
                    "parameter '{name}' must be a boolean, got '{s}'"
                ))),
            },
            Some(other) => Err(MixpanelError::InvalidInput(format!(
                "parameter '{name}' must be a boolean, got {other}"
            ))),
        }
    }

    /// Optional integer; accepts numeric strings.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidInput` for non-integer values.
    pub fn optional_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
                MixpanelError::InvalidInput(format!("parameter '{name}' must be an integer"))
            }),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                MixpanelError::InvalidInput(format!("parameter '{name}' must be an integer"))
            }),
            Some(other) => Err(MixpanelError::InvalidInput(format!(
                "parameter '{name}' must be an integer, got {other}"
            ))),
        }
    }

    /// JSON value that may arrive encoded in a string.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidPayload` naming the field when the
    /// string is not valid JSON.
    pub fn json(&self, name: &str) -> Result<Option<Value>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
            Some(Value::String(raw)) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|err| MixpanelError::invalid_payload(name, format!("malformed JSON: {err}"))),
            Some(value) => Ok(Some(value.clone())),
        }
    }

    /// JSON object parameter; absent means empty.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidPayload` for malformed JSON or a
    /// non-object value.
    pub fn json_object(&self, name: &str) -> Result<Record> {
        match self.json(name)? {
            None => Ok(Record::new()),
            Some(Value::Object(map)) => Ok(map),
            Some(other) => {
                Err(MixpanelError::invalid_payload(name, format!("expected an object, got {other}")))
            }
        }
    }

    /// JSON array parameter; absent means empty.
    ///
    /// # Errors
    /// Returns `MixpanelError::InvalidPayload` for malformed JSON or a
    /// non-array value.
    pub fn json_array(&self, name: &str) -> Result<Vec<Value>> {
        match self.json(name)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                Err(MixpanelError::invalid_payload(name, format!("expected an array, got {other}")))
            }
        }
    }
}

impl From<Record> for OperationParams {
    fn from(values: Record) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> OperationParams {
        OperationParams::from_value(value)
    }

    #[test]
    fn required_str_rejects_missing_and_blank() {
        let p = params(json!({"a": "x", "b": " ", "n": 12}));
        assert_eq!(p.required_str("a").unwrap(), "x");
        assert_eq!(p.required_str("n").unwrap(), "12");
        assert!(matches!(p.required_str("b"), Err(MixpanelError::InvalidInput(_))));
        assert!(matches!(p.required_str("missing"), Err(MixpanelError::InvalidInput(_))));
    }

    #[test]
    fn json_accepts_native_and_encoded_values() {
        let p = params(json!({"native": {"a": 1}, "encoded": "{\"b\": 2}", "list": "[1,2]"}));
        assert_eq!(p.json_object("native").unwrap()["a"], 1);
        assert_eq!(p.json_object("encoded").unwrap()["b"], 2);
        assert_eq!(p.json_array("list").unwrap(), vec![json!(1), json!(2)]);
        assert!(p.json_object("missing").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_names_the_field() {
        let p = params(json!({"properties": "{not json"}));
        let err = p.json_object("properties").unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidPayload { ref field, .. } if field == "properties"));
    }

    #[test]
    fn wrong_json_shape_is_invalid_payload() {
        let p = params(json!({"events": "{\"a\":1}"}));
        assert!(matches!(p.json_array("events"), Err(MixpanelError::InvalidPayload { .. })));
    }

    #[test]
    fn scalar_accessors_accept_strings() {
        let p = params(json!({"flag": "TRUE", "n": "42", "bad": "x", "null": null}));
        assert_eq!(p.optional_bool("flag").unwrap(), Some(true));
        assert_eq!(p.optional_i64("n").unwrap(), Some(42));
        assert!(p.optional_i64("bad").is_err());
        assert_eq!(p.optional_str("null").unwrap(), None);
        assert!(!p.contains("null"));
    }
}
