//! Lookup table management handlers (service-account auth)

use async_trait::async_trait;
use mixpanel_core::{normalize_query, OperationHandler, OperationParams};
use mixpanel_domain::constants::PATH_LOOKUP_TABLES;
use mixpanel_domain::{ApiFamily, MixpanelError, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use super::HandlerContext;
use crate::api::ApiRequest;

fn require_project_id(ctx: &HandlerContext, params: &OperationParams) -> Result<String> {
    ctx.project_id(params)?.ok_or_else(|| {
        MixpanelError::InvalidInput("parameter 'project_id' is required for lookup tables".into())
    })
}

/// `lookupTable/list`: one item per lookup table.
pub struct LookupTableListHandler {
    ctx: HandlerContext,
}

impl LookupTableListHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for LookupTableListHandler {
    #[instrument(skip_all, name = "lookup_table.list")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let request = ApiRequest::get(ApiFamily::ServiceAccount, PATH_LOOKUP_TABLES)
            .with_query("project_id", require_project_id(&self.ctx, params)?);

        match self.ctx.query(&request).await? {
            Value::Object(mut body) => match body.remove("results") {
                Some(Value::Array(tables)) => Ok(tables),
                Some(other) => Ok(normalize_query(other)),
                None => Ok(vec![Value::Object(body)]),
            },
            other => Ok(normalize_query(other)),
        }
    }
}

/// `lookupTable/replace`: PUT a CSV body over an existing table.
///
/// Parameters: `lookup_table_id` and `data` (CSV text with a header row).
pub struct LookupTableReplaceHandler {
    ctx: HandlerContext,
}

impl LookupTableReplaceHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for LookupTableReplaceHandler {
    #[instrument(skip_all, name = "lookup_table.replace")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let table_id = params.required_str("lookup_table_id")?;
        let data = params.required_str("data")?;
        if data.lines().filter(|line| !line.trim().is_empty()).count() < 2 {
            return Err(MixpanelError::invalid_payload(
                "data",
                "CSV needs a header row and at least one data row",
            ));
        }

        let path = format!("{PATH_LOOKUP_TABLES}/{table_id}");
        let request = ApiRequest::new(ApiFamily::ServiceAccount, Method::PUT, path)
            .with_query("project_id", require_project_id(&self.ctx, params)?)
            .with_csv(data);
        self.ctx.query_items(&request).await
    }
}
