//! Raw event export handler

use async_trait::async_trait;
use mixpanel_core::{OperationHandler, OperationParams};
use mixpanel_domain::{ApiFamily, MixpanelError, Result};
use serde_json::Value;
use tracing::{info, instrument};

use super::HandlerContext;
use crate::api::ApiRequest;

/// `export/events`: GET the export base URL with `from_date`/`to_date`.
///
/// Optional `event` (array of names, or JSON string of one), `where` and
/// `limit`. The body is decoded by the export normalizer.
pub struct ExportHandler {
    ctx: HandlerContext,
}

impl ExportHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn request(&self, params: &OperationParams) -> Result<ApiRequest> {
        let mut request = ApiRequest::get(ApiFamily::Export, "")
            .with_query("from_date", params.required_str("from_date")?)
            .with_query("to_date", params.required_str("to_date")?);

        if let Some(project_id) = self.ctx.project_id(params)? {
            request = request.with_query("project_id", project_id);
        }

        match params.json("event")? {
            None => {}
            Some(Value::Array(names)) if names.is_empty() => {}
            Some(Value::Array(names)) => {
                request = request.with_query("event", Value::Array(names).to_string());
            }
            Some(Value::String(name)) => {
                let names = Value::Array(vec![Value::String(name)]);
                request = request.with_query("event", names.to_string());
            }
            Some(other) => {
                return Err(MixpanelError::invalid_payload(
                    "event",
                    format!("expected an array of event names, got {other}"),
                ))
            }
        }

        if let Some(filter) = params.optional_str("where")? {
            request = request.with_query("where", filter);
        }
        if let Some(limit) = params.optional_i64("limit")? {
            request = request.with_query("limit", limit.to_string());
        }
        Ok(request)
    }
}

#[async_trait]
impl OperationHandler for ExportHandler {
    #[instrument(skip_all, name = "export.events")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let request = self.request(params)?;
        let records = self.ctx.export(&request).await?;
        info!(records = records.len(), "export decoded");
        Ok(records)
    }
}
