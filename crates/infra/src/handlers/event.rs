//! Event tracking and import handlers

use async_trait::async_trait;
use mixpanel_core::timestamp;
use mixpanel_core::{build_event, idempotency, EventOptions, OperationHandler, OperationParams};
use mixpanel_domain::constants::{PATH_IMPORT, PATH_TRACK, PROP_DISTINCT_ID, PROP_INSERT_ID, PROP_TIME};
use mixpanel_domain::{ApiFamily, MixpanelError, Record, Result};
use serde_json::Value;
use tracing::{debug, instrument};

use super::HandlerContext;
use crate::api::{ApiRequest, AuthScheme};

/// `event/track`: send one event to `/track`.
///
/// Parameters: `event`, `distinct_id`, optional `properties` (object or JSON
/// string), `time`, `ip` and `insert_id`.
pub struct TrackHandler {
    ctx: HandlerContext,
}

impl TrackHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for TrackHandler {
    #[instrument(skip_all, name = "event.track")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let event = params.required_str("event")?;
        let distinct_id = params.required_str("distinct_id")?;
        let extra = params.json_object("properties")?;

        let mut options = EventOptions::default();
        if let Some(raw) = params.get("time") {
            options = options.with_time(timestamp::parse("time", raw)?);
        }
        if let Some(ip) = params.optional_str("ip")? {
            options = options.with_ip(ip);
        }
        let insert_id =
            params.optional_str("insert_id")?.unwrap_or_else(|| idempotency::generate(&distinct_id));

        let record = build_event(
            &event,
            &self.ctx.credentials().project_token,
            &distinct_id,
            &insert_id,
            &extra,
            &options,
        )?;
        debug!(event = %record.event, "tracking event");

        let request = ApiRequest::post(ApiFamily::Ingestion, PATH_TRACK)
            .with_json(Value::Array(vec![record.into_value()]));
        Ok(vec![self.ctx.ingest(&request).await?])
    }
}

/// `event/trackBatch`: send an array of `{event, properties}` to `/track`
/// in planned batches.
pub struct TrackBatchHandler {
    ctx: HandlerContext,
}

impl TrackBatchHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for TrackBatchHandler {
    #[instrument(skip_all, name = "event.track_batch")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let records = shape_events(&self.ctx.credentials().project_token, params, false)?;
        let template = ApiRequest::post(ApiFamily::Ingestion, PATH_TRACK);
        self.ctx.forwarder().forward(records, &template).await
    }
}

/// `event/import`: historical events through `/import`.
///
/// Every event needs an explicit `time`. Signed with the project secret and
/// sent with `strict=1`, plus `project_id` when one is known.
pub struct ImportHandler {
    ctx: HandlerContext,
}

impl ImportHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for ImportHandler {
    #[instrument(skip_all, name = "event.import")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let records = shape_events(&self.ctx.credentials().project_token, params, true)?;

        let mut template = ApiRequest::post(ApiFamily::Ingestion, PATH_IMPORT)
            .with_auth(AuthScheme::ProjectSecret)
            .with_query("strict", "1");
        if let Some(project_id) = self.ctx.project_id(params)? {
            template = template.with_query("project_id", project_id);
        }

        self.ctx.forwarder().forward(records, &template).await
    }
}

/// Shape the `events` parameter into wire records.
fn shape_events(token: &str, params: &OperationParams, require_time: bool) -> Result<Vec<Value>> {
    let events = params.json_array("events")?;
    if events.is_empty() {
        return Err(MixpanelError::InvalidInput("parameter 'events' must not be empty".into()));
    }

    events
        .into_iter()
        .enumerate()
        .map(|(index, raw)| shape_event(token, index, raw, require_time))
        .collect()
}

fn shape_event(token: &str, index: usize, raw: Value, require_time: bool) -> Result<Value> {
    let field = format!("events[{index}]");
    let mut entry = match raw {
        Value::Object(map) => map,
        other => {
            return Err(MixpanelError::invalid_payload(field, format!("expected an object, got {other}")))
        }
    };

    let event = match entry.remove("event") {
        Some(Value::String(name)) if !name.trim().is_empty() => name,
        _ => return Err(MixpanelError::InvalidInput(format!("{field}.event is required"))),
    };
    let properties: Record = match entry.remove("properties") {
        None | Some(Value::Null) => Record::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(MixpanelError::invalid_payload(
                format!("{field}.properties"),
                format!("expected an object, got {other}"),
            ))
        }
    };

    let distinct_id = match properties.get(PROP_DISTINCT_ID) {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(MixpanelError::InvalidInput(format!(
                "{field}.properties.distinct_id is required"
            )))
        }
    };

    let mut options = EventOptions::default();
    match properties.get(PROP_TIME).filter(|value| !value.is_null()) {
        Some(raw) => {
            let time = timestamp::parse(&format!("{field}.properties.time"), raw)?;
            options = options.with_time(time);
        }
        None if require_time => {
            return Err(MixpanelError::InvalidInput(format!(
                "{field}.properties.time is required for import"
            )))
        }
        None => {}
    }

    let insert_id = match properties.get(PROP_INSERT_ID) {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        _ => idempotency::generate(&distinct_id),
    };

    let record = build_event(&event, token, &distinct_id, &insert_id, &properties, &options)?;
    Ok(record.into_value())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> OperationParams {
        OperationParams::from_value(value)
    }

    #[test]
    fn batch_events_are_shaped_in_order() {
        let records = shape_events(
            "tok",
            &params(json!({"events": [
                {"event": "A", "properties": {"distinct_id": "u1", "time": 1_700_000_000_000i64}},
                {"event": "B", "properties": {"distinct_id": "u2", "$insert_id": "fixed"}},
            ]})),
            false,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "A");
        assert_eq!(records[0]["properties"]["time"], 1_700_000_000);
        assert_eq!(records[0]["properties"]["token"], "tok");
        assert_eq!(records[1]["properties"]["$insert_id"], "fixed");
        assert!(records[1]["properties"]["time"].is_i64());
    }

    #[test]
    fn events_may_arrive_as_json_string() {
        let raw = r#"[{"event": "A", "properties": {"distinct_id": "u1"}}]"#;
        let records = shape_events("tok", &params(json!({ "events": raw })), false).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn malformed_events_json_names_the_field() {
        let err = shape_events("tok", &params(json!({"events": "[{"})), false).unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidPayload { field, .. } if field == "events"));
    }

    #[test]
    fn import_requires_explicit_time() {
        let err = shape_events(
            "tok",
            &params(json!({"events": [{"event": "A", "properties": {"distinct_id": "u1"}}]})),
            true,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MixpanelError::InvalidInput("events[0].properties.time is required for import".into())
        );
    }

    #[test]
    fn missing_distinct_id_is_rejected() {
        let err = shape_events("tok", &params(json!({"events": [{"event": "A"}]})), false).unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidInput(msg) if msg.contains("distinct_id")));
    }
}
