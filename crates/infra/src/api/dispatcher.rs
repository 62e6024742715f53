//! Request dispatcher
//!
//! Issues one HTTP call per [`ApiRequest`]: resolves the regional base URL,
//! signs the request with the family's [`Auth`], applies the family timeout,
//! and maps non-2xx responses onto [`ApiError`]. Retries are not handled here.

use std::time::Duration;

use mixpanel_core::{normalize_export_text, EndpointResolver, IngestionOutcome};
use mixpanel_domain::{ApiFamily, Config, Credentials, TransportConfig};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::{Auth, AuthScheme};
use super::errors::ApiError;
use crate::http::HttpClient;

/// Request body encodings used by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(Value),
    Form(Vec<(String, String)>),
    Csv(String),
}

/// One logical HTTP call, independent of region and credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub family: ApiFamily,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Overrides the family's default scheme (used by `/import`).
    pub auth: Option<AuthScheme>,
}

impl ApiRequest {
    pub fn new(family: ApiFamily, method: Method, path: impl Into<String>) -> Self {
        Self {
            family,
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            auth: None,
        }
    }

    pub fn get(family: ApiFamily, path: impl Into<String>) -> Self {
        Self::new(family, Method::GET, path)
    }

    pub fn post(family: ApiFamily, path: impl Into<String>) -> Self {
        Self::new(family, Method::POST, path)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn with_csv(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Csv(body.into());
        self
    }

    pub fn with_auth(mut self, scheme: AuthScheme) -> Self {
        self.auth = Some(scheme);
        self
    }

    /// Scheme this request will be signed with.
    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth.unwrap_or_else(|| AuthScheme::for_family(self.family))
    }
}

/// Sends [`ApiRequest`]s for one project.
pub struct RequestDispatcher {
    http: HttpClient,
    resolver: EndpointResolver,
    credentials: Credentials,
    transport: TransportConfig,
}

impl RequestDispatcher {
    /// Build a dispatcher from validated configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.transport.request_timeout())
            .user_agent(config.transport.user_agent.clone())
            .build()?;
        Self::with_client(http, config)
    }

    /// Build a dispatcher around an existing client.
    pub fn with_client(http: HttpClient, config: &Config) -> Result<Self, ApiError> {
        let resolver = EndpointResolver::new(config.endpoints.clone())?;
        Ok(Self {
            http,
            resolver,
            credentials: config.credentials.clone(),
            transport: config.transport.clone(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Send an ingestion request and classify the `1` / `0` / object body.
    pub async fn ingest(&self, request: &ApiRequest) -> Result<IngestionOutcome, ApiError> {
        let body = self.send(request).await?;
        Ok(IngestionOutcome::from_body(&body)?)
    }

    /// Send a query or management request; the JSON body is returned as-is.
    pub async fn query(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let body = self.send(request).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Send an export request and decode its records.
    pub async fn export(&self, request: &ApiRequest) -> Result<Vec<Value>, ApiError> {
        let body = self.send(request).await?;
        Ok(normalize_export_text(&body)?)
    }

    /// One attempt; returns the raw body of a 2xx response.
    #[instrument(skip(self, request), fields(family = %request.family, method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let auth = Auth::resolve(request.auth_scheme(), &self.credentials)?;
        let url = self.resolver.url(self.credentials.region, request.family, &request.path)?;
        let timeout = self.timeout_for(request.family);

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Csv(text) => {
                builder.header(reqwest::header::CONTENT_TYPE, "text/csv").body(text.clone())
            }
        };
        builder = auth.apply(builder);

        let response = self.http.send(builder, Some(timeout)).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Protocol(format!("failed to read response body: {err}")))?;

        if status.is_success() {
            debug!(%status, bytes = body.len(), "request succeeded");
            Ok(body)
        } else {
            warn!(%status, "request failed");
            Err(map_status_error(status, &body))
        }
    }

    fn timeout_for(&self, family: ApiFamily) -> Duration {
        self.transport.timeout_for(family)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("resolver", &self.resolver)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Map a non-2xx response onto [`ApiError`], carrying the upstream message.
pub fn map_status_error(status: StatusCode, body: &str) -> ApiError {
    let message = upstream_message(status, body);
    match status.as_u16() {
        401 | 403 => ApiError::Auth(message),
        402 => ApiError::Billing(message),
        429 => ApiError::RateLimit(message),
        code @ 500..=599 => ApiError::Server { status: code, message },
        code => ApiError::Client { status: code, message },
    }
}

fn upstream_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("unknown status").to_string();
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
}
