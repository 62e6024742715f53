//! Ingestion response classification
//!
//! The ingestion endpoints answer with `1` on success, `0` on rejection, or a
//! JSON object (verbose mode, `/import`). That overload is resolved here and
//! nowhere else.

use mixpanel_domain::{MixpanelError, Result};
use serde_json::{json, Value};

/// Outcome of one ingestion request.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionOutcome {
    Success,
    Failure(String),
    Payload(Value),
}

impl IngestionOutcome {
    /// Classify a raw response body.
    ///
    /// # Errors
    /// Returns `MixpanelError::Protocol` when the body is neither `1`, `0`,
    /// nor a JSON object.
    pub fn from_body(body: &str) -> Result<Self> {
        let trimmed = body.trim();
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Self::from_value(value),
            Err(_) => match trimmed {
                "1" => Ok(Self::Success),
                "0" => Ok(Self::Failure("the service rejected the payload".into())),
                _ => Err(protocol_error(trimmed)),
            },
        }
    }

    /// Classify an already-parsed body.
    ///
    /// # Errors
    /// See [`IngestionOutcome::from_body`].
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Number(ref n) if n.as_i64() == Some(1) => Ok(Self::Success),
            Value::Number(ref n) if n.as_i64() == Some(0) => {
                Ok(Self::Failure("the service rejected the payload".into()))
            }
            Value::String(ref s) if s.trim() == "1" => Ok(Self::Success),
            Value::String(ref s) if s.trim() == "0" => {
                Ok(Self::Failure("the service rejected the payload".into()))
            }
            Value::Object(ref map) if map.get("status").and_then(Value::as_i64) == Some(0) => {
                let reason = map
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("the service rejected the payload")
                    .to_string();
                Ok(Self::Failure(reason))
            }
            Value::Object(_) => Ok(Self::Payload(value)),
            other => Err(protocol_error(&other.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }

    /// Output item for a successful outcome.
    ///
    /// # Errors
    /// Returns `MixpanelError::Api` carrying the rejection reason for
    /// [`IngestionOutcome::Failure`].
    pub fn into_item(self) -> Result<Value> {
        match self {
            Self::Success => Ok(json!({ "success": true })),
            Self::Payload(value) => Ok(value),
            Self::Failure(reason) => Err(MixpanelError::Api { status: 200, message: reason }),
        }
    }
}

fn protocol_error(body: &str) -> MixpanelError {
    let excerpt: String = body.chars().take(200).collect();
    MixpanelError::Protocol(format!("unexpected ingestion response body: {excerpt}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_is_success_in_any_encoding() {
        assert_eq!(IngestionOutcome::from_body("1").unwrap(), IngestionOutcome::Success);
        assert_eq!(IngestionOutcome::from_body(" 1\n").unwrap(), IngestionOutcome::Success);
        assert_eq!(IngestionOutcome::from_body("\"1\"").unwrap(), IngestionOutcome::Success);
    }

    #[test]
    fn zero_is_failure() {
        assert!(matches!(IngestionOutcome::from_body("0").unwrap(), IngestionOutcome::Failure(_)));
        assert!(!IngestionOutcome::from_body("\"0\"").unwrap().is_success());
    }

    #[test]
    fn verbose_status_zero_carries_the_error() {
        let outcome = IngestionOutcome::from_body(r#"{"status":0,"error":"bad token"}"#).unwrap();
        assert_eq!(outcome, IngestionOutcome::Failure("bad token".into()));
    }

    #[test]
    fn objects_are_payloads() {
        let body = r#"{"code":200,"num_records_imported":2,"status":"OK"}"#;
        let outcome = IngestionOutcome::from_body(body).unwrap();
        assert!(matches!(outcome, IngestionOutcome::Payload(ref v) if v["num_records_imported"] == 2));
    }

    #[test]
    fn anything_else_is_a_protocol_error() {
        for body in ["2", "[1]", "ok", "", "null"] {
            let err = IngestionOutcome::from_body(body).unwrap_err();
            assert!(matches!(err, MixpanelError::Protocol(_)), "body {body:?}");
        }
    }

    #[test]
    fn into_item_maps_outcomes() {
        assert_eq!(IngestionOutcome::Success.into_item().unwrap(), json!({"success": true}));
        assert!(IngestionOutcome::Failure("x".into()).into_item().is_err());
    }
}
