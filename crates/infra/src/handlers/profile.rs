//! Profile (`/engage`) and group (`/groups`) update handlers

use async_trait::async_trait;
use mixpanel_core::{
    build_group_update, build_profile_update, OperationHandler, OperationParams, ProfileOptions,
};
use mixpanel_domain::constants::{PATH_ENGAGE, PATH_GROUPS};
use mixpanel_domain::{ApiFamily, Result, UpdateOperation};
use serde_json::Value;
use tracing::{debug, instrument};

use super::HandlerContext;
use crate::api::ApiRequest;

/// Read the operation payload from its parameter.
///
/// `$unset` takes `property_names` (array), `$delete` takes nothing, every
/// other operation takes `properties` (object, or JSON string of one).
fn update_payload(operation: UpdateOperation, params: &OperationParams) -> Result<Value> {
    match operation {
        UpdateOperation::Delete => Ok(Value::Null),
        UpdateOperation::Unset => Ok(Value::Array(params.json_array("property_names")?)),
        _ => Ok(Value::Object(params.json_object("properties")?)),
    }
}

/// `profile/<operation>`: one user-profile update.
pub struct ProfileUpdateHandler {
    ctx: HandlerContext,
    operation: UpdateOperation,
}

impl ProfileUpdateHandler {
    pub fn new(ctx: HandlerContext, operation: UpdateOperation) -> Self {
        Self { ctx, operation }
    }
}

#[async_trait]
impl OperationHandler for ProfileUpdateHandler {
    #[instrument(skip_all, name = "profile.update", fields(operation = %self.operation))]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let distinct_id = params.required_str("distinct_id")?;
        let payload = update_payload(self.operation, params)?;

        let mut options = ProfileOptions::default();
        if let Some(ip) = params.optional_str("ip")? {
            options = options.with_ip(ip);
        }
        if let Some(ignore_time) = params.optional_bool("ignore_time")? {
            options = options.with_ignore_time(ignore_time);
        }

        let record = build_profile_update(
            &self.ctx.credentials().project_token,
            &distinct_id,
            self.operation,
            payload,
            &options,
        )?;
        debug!("sending profile update");

        let request = ApiRequest::post(ApiFamily::Ingestion, PATH_ENGAGE)
            .with_json(Value::Array(vec![Value::Object(record)]));
        Ok(vec![self.ctx.ingest(&request).await?])
    }
}

/// `group/<operation>`: one group-profile update.
pub struct GroupUpdateHandler {
    ctx: HandlerContext,
    operation: UpdateOperation,
}

impl GroupUpdateHandler {
    pub fn new(ctx: HandlerContext, operation: UpdateOperation) -> Self {
        Self { ctx, operation }
    }
}

#[async_trait]
impl OperationHandler for GroupUpdateHandler {
    #[instrument(skip_all, name = "group.update", fields(operation = %self.operation))]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let group_key = params.required_str("group_key")?;
        let group_id = params.required_str("group_id")?;
        let payload = update_payload(self.operation, params)?;

        let record = build_group_update(
            &self.ctx.credentials().project_token,
            &group_key,
            &group_id,
            self.operation,
            payload,
        )?;

        let request = ApiRequest::post(ApiFamily::Ingestion, PATH_GROUPS)
            .with_json(Value::Array(vec![Value::Object(record)]));
        Ok(vec![self.ctx.ingest(&request).await?])
    }
}

#[cfg(test)]
mod tests {
    use mixpanel_domain::MixpanelError;
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_reads_property_names() {
        let params = OperationParams::from_value(json!({"property_names": "[\"plan\", \"age\"]"}));
        let payload = update_payload(UpdateOperation::Unset, &params).unwrap();
        assert_eq!(payload, json!(["plan", "age"]));
    }

    #[test]
    fn set_reads_properties_object() {
        let params = OperationParams::from_value(json!({"properties": {"name": "John"}}));
        let payload = update_payload(UpdateOperation::Set, &params).unwrap();
        assert_eq!(payload, json!({"name": "John"}));
    }

    #[test]
    fn malformed_properties_are_invalid_payload() {
        let params = OperationParams::from_value(json!({"properties": "{name:"}));
        let err = update_payload(UpdateOperation::SetOnce, &params).unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidPayload { field, .. } if field == "properties"));
    }
}
