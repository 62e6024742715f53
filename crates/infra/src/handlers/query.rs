//! Query API handlers
//!
//! Query semantics are opaque: parameters are copied onto the request and
//! the response is normalized into items.

use async_trait::async_trait;
use mixpanel_core::{normalize_query, OperationHandler, OperationParams};
use mixpanel_domain::constants::{
    PATH_COHORTS, PATH_COHORTS_LIST, PATH_ENGAGE_QUERY, PATH_FUNNELS, PATH_INSIGHTS, PATH_JQL,
    PATH_RETENTION, PATH_SEGMENTATION,
};
use mixpanel_domain::{ApiFamily, MixpanelError, Result};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::HandlerContext;
use crate::api::ApiRequest;

/// Static description of a parameter-passthrough query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryEndpoint {
    pub name: &'static str,
    pub path: &'static str,
    pub method: QueryMethod,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

/// GET sends parameters in the query string, POST as a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMethod {
    Get,
    Post,
}

impl QueryEndpoint {
    pub const INSIGHTS: Self = Self {
        name: "insights",
        path: PATH_INSIGHTS,
        method: QueryMethod::Get,
        required: &["bookmark_id"],
        optional: &["workspace_id"],
    };

    pub const FUNNELS: Self = Self {
        name: "funnels",
        path: PATH_FUNNELS,
        method: QueryMethod::Get,
        required: &["funnel_id", "from_date", "to_date"],
        optional: &["length", "length_unit", "interval", "unit", "on", "where", "limit"],
    };

    pub const RETENTION: Self = Self {
        name: "retention",
        path: PATH_RETENTION,
        method: QueryMethod::Get,
        required: &["from_date", "to_date"],
        optional: &[
            "retention_type",
            "born_event",
            "event",
            "born_where",
            "where",
            "interval",
            "interval_count",
            "unit",
            "on",
            "limit",
        ],
    };

    pub const SEGMENTATION: Self = Self {
        name: "segmentation",
        path: PATH_SEGMENTATION,
        method: QueryMethod::Get,
        required: &["event", "from_date", "to_date"],
        optional: &["on", "unit", "interval", "where", "limit", "type"],
    };

    pub const COHORTS: Self = Self {
        name: "cohorts",
        path: PATH_COHORTS,
        method: QueryMethod::Get,
        required: &["cohort_id"],
        optional: &[],
    };

    pub const COHORTS_LIST: Self = Self {
        name: "cohortsList",
        path: PATH_COHORTS_LIST,
        method: QueryMethod::Post,
        required: &[],
        optional: &[],
    };

    pub const ALL: [Self; 6] = [
        Self::INSIGHTS,
        Self::FUNNELS,
        Self::RETENTION,
        Self::SEGMENTATION,
        Self::COHORTS,
        Self::COHORTS_LIST,
    ];
}

/// Handler for every [`QueryEndpoint`].
pub struct QueryHandler {
    ctx: HandlerContext,
    endpoint: QueryEndpoint,
}

impl QueryHandler {
    pub fn new(ctx: HandlerContext, endpoint: QueryEndpoint) -> Self {
        Self { ctx, endpoint }
    }

    /// Collect parameters in declaration order, `project_id` first.
    fn collect(&self, params: &OperationParams) -> Result<Vec<(String, String)>> {
        let mut fields = Vec::new();
        if let Some(project_id) = self.ctx.project_id(params)? {
            fields.push(("project_id".to_string(), project_id));
        }
        for name in self.endpoint.required {
            let value = param_string(params, name)?.ok_or_else(|| {
                MixpanelError::InvalidInput(format!("parameter '{name}' is required"))
            })?;
            fields.push(((*name).to_string(), value));
        }
        for name in self.endpoint.optional {
            if let Some(value) = param_string(params, name)? {
                fields.push(((*name).to_string(), value));
            }
        }
        Ok(fields)
    }

    fn request(&self, fields: Vec<(String, String)>) -> ApiRequest {
        match self.endpoint.method {
            QueryMethod::Get => fields.into_iter().fold(
                ApiRequest::get(ApiFamily::Query, self.endpoint.path),
                |request, (name, value)| request.with_query(name, value),
            ),
            QueryMethod::Post => {
                let body: Map<String, Value> =
                    fields.into_iter().map(|(name, value)| (name, Value::String(value))).collect();
                ApiRequest::post(ApiFamily::Query, self.endpoint.path).with_json(Value::Object(body))
            }
        }
    }
}

#[async_trait]
impl OperationHandler for QueryHandler {
    #[instrument(skip_all, name = "query", fields(endpoint = self.endpoint.name))]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let request = self.request(self.collect(params)?);
        self.ctx.query_items(&request).await
    }
}

/// `query/jql`: run a JQL script (form-encoded `script` and `params`).
pub struct JqlHandler {
    ctx: HandlerContext,
}

impl JqlHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl OperationHandler for JqlHandler {
    #[instrument(skip_all, name = "query.jql")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let mut form = vec![("script".to_string(), params.required_str("script")?)];
        if let Some(script_params) = params.json("params")? {
            form.push(("params".to_string(), script_params.to_string()));
        }

        let mut request = ApiRequest::post(ApiFamily::Query, PATH_JQL);
        if let Some(project_id) = self.ctx.project_id(params)? {
            request = request.with_query("project_id", project_id);
        }
        self.ctx.query_items(&request.with_form(form)).await
    }
}

/// `query/profiles`: query user profiles through `/2.0/engage`.
///
/// With `returnAll`, pages are fetched sequentially using the returned
/// `session_id` until a page comes back shorter than `page_size`, or a
/// response does not echo the requested page. More than `max_pages` pages is
/// a protocol error. Otherwise one page is fetched and `limit` (when given)
/// truncates the items.
pub struct ProfileQueryHandler {
    ctx: HandlerContext,
    max_pages: usize,
}

/// Upper bound on pages fetched by one `returnAll` query.
pub const MAX_PROFILE_PAGES: usize = 1000;

impl ProfileQueryHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx, max_pages: MAX_PROFILE_PAGES }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn page_request(&self, base: &[(String, String)], session: Option<(&str, u64)>) -> ApiRequest {
        let mut form = base.to_vec();
        if let Some((session_id, page)) = session {
            form.push(("session_id".to_string(), session_id.to_string()));
            form.push(("page".to_string(), page.to_string()));
        }
        ApiRequest::post(ApiFamily::Query, PATH_ENGAGE_QUERY).with_form(form)
    }
}

#[async_trait]
impl OperationHandler for ProfileQueryHandler {
    #[instrument(skip_all, name = "query.profiles")]
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>> {
        let mut base = Vec::new();
        if let Some(project_id) = self.ctx.project_id(params)? {
            base.push(("project_id".to_string(), project_id));
        }
        for name in ["distinct_id", "where", "cohort_id", "filter_by_cohort"] {
            if let Some(value) = param_string(params, name)? {
                base.push((name.to_string(), value));
            }
        }
        if let Some(properties) = params.json("output_properties")? {
            base.push(("output_properties".to_string(), properties.to_string()));
        }

        let return_all = params.optional_bool("returnAll")?.unwrap_or(false);
        let limit = params.optional_i64("limit")?.map(|limit| limit.max(0) as usize);

        let first = self.ctx.query(&self.page_request(&base, None)).await?;
        let mut page = Page::from_body(&first);
        let mut items = normalize_query(first);

        if return_all {
            let mut requested = 0;
            let mut fetched = 1;
            while let Some((session_id, next_page)) = page.next() {
                if page.page != Some(requested) {
                    warn!(requested, returned = ?page.page, "profile page not echoed, stopping");
                    break;
                }
                if fetched >= self.max_pages {
                    return Err(MixpanelError::Protocol(format!(
                        "profile query exceeded {} pages",
                        self.max_pages
                    )));
                }
                debug!(page = next_page, fetched = items.len(), "fetching next profile page");
                let request = self.page_request(&base, Some((&session_id, next_page)));
                let body = self.ctx.query(&request).await?;
                page = Page::from_body(&body);
                items.extend(normalize_query(body));
                requested = next_page;
                fetched += 1;
            }
        } else if let Some(limit) = limit {
            items.truncate(limit);
        }

        Ok(items)
    }
}

/// Pagination state read from one `/2.0/engage` response.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Page {
    session_id: Option<String>,
    page: Option<u64>,
    page_size: u64,
    returned: usize,
}

impl Page {
    fn from_body(body: &Value) -> Self {
        Self {
            session_id: body.get("session_id").and_then(Value::as_str).map(str::to_string),
            page: body.get("page").and_then(Value::as_u64),
            page_size: body.get("page_size").and_then(Value::as_u64).unwrap_or(0),
            returned: body.get("results").and_then(Value::as_array).map_or(0, Vec::len),
        }
    }

    /// Session and page number to fetch next, or `None` after a short page
    /// or when the response carries no page number.
    fn next(&self) -> Option<(String, u64)> {
        let session_id = self.session_id.clone()?;
        let page = self.page?;
        if self.page_size == 0 || (self.returned as u64) < self.page_size {
            return None;
        }
        Some((session_id, page.checked_add(1)?))
    }
}

/// Parameter as a wire string; objects and arrays are JSON-encoded.
fn param_string(params: &OperationParams, name: &str) -> Result<Option<String>> {
    match params.get(name) {
        Some(Value::Array(_) | Value::Object(_)) => Ok(params.get(name).map(Value::to_string)),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        _ => params.optional_str(name),
    }
}
