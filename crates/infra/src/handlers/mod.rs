//! Operation handlers
//!
//! One [`OperationHandler`] per `(resource, operation)` pair, each shaping its
//! request with the core payload builders and sending it through the shared
//! [`HandlerContext`]. [`build_registry`] wires them all up once at start-up.

use std::sync::Arc;

use mixpanel_core::{normalize_query, IngestionOutcome, OperationParams, OperationRegistry};
use mixpanel_domain::{Config, Credentials, Result, UpdateOperation};
use serde_json::Value;

use crate::api::{ApiError, ApiRequest, BatchForwarder, RequestDispatcher, RetryPolicy};

pub mod event;
pub mod export;
pub mod lookup;
pub mod profile;
pub mod query;

pub use event::{ImportHandler, TrackBatchHandler, TrackHandler};
pub use export::ExportHandler;
pub use lookup::{LookupTableListHandler, LookupTableReplaceHandler};
pub use profile::{GroupUpdateHandler, ProfileUpdateHandler};
pub use query::{JqlHandler, ProfileQueryHandler, QueryEndpoint, QueryHandler};

/// Dispatcher plus retry policy shared by every handler.
#[derive(Clone)]
pub struct HandlerContext {
    dispatcher: Arc<RequestDispatcher>,
    retry: RetryPolicy,
    max_batch_size: usize,
}

impl HandlerContext {
    pub fn new(dispatcher: Arc<RequestDispatcher>, retry: RetryPolicy, max_batch_size: usize) -> Self {
        Self { dispatcher, retry, max_batch_size }
    }

    pub fn credentials(&self) -> &Credentials {
        self.dispatcher.credentials()
    }

    pub fn forwarder(&self) -> BatchForwarder {
        BatchForwarder::new(Arc::clone(&self.dispatcher), self.retry, self.max_batch_size)
    }

    /// `project_id` parameter, falling back to the configured one.
    pub fn project_id(&self, params: &OperationParams) -> Result<Option<String>> {
        Ok(params.optional_str("project_id")?.or_else(|| self.credentials().project_id.clone()))
    }

    /// Send a single ingestion request; a rejected payload is an error.
    pub async fn ingest(&self, request: &ApiRequest) -> Result<Value> {
        let dispatcher = &self.dispatcher;
        let outcome = self
            .retry
            .execute(move |_| async move {
                match dispatcher.ingest(request).await? {
                    IngestionOutcome::Failure(reason) => Err(ApiError::Rejected(reason)),
                    outcome => Ok(outcome),
                }
            })
            .await?;
        outcome.into_item()
    }

    /// Send a query request and return its JSON body unchanged.
    pub async fn query(&self, request: &ApiRequest) -> Result<Value> {
        let dispatcher = &self.dispatcher;
        Ok(self.retry.execute(move |_| async move { dispatcher.query(request).await }).await?)
    }

    /// Send a query request and normalize the body into items.
    pub async fn query_items(&self, request: &ApiRequest) -> Result<Vec<Value>> {
        Ok(normalize_query(self.query(request).await?))
    }

    /// Send an export request and decode its records.
    pub async fn export(&self, request: &ApiRequest) -> Result<Vec<Value>> {
        let dispatcher = &self.dispatcher;
        Ok(self.retry.execute(move |_| async move { dispatcher.export(request).await }).await?)
    }
}

/// Build the registry of every supported operation.
pub fn build_registry(dispatcher: Arc<RequestDispatcher>, config: &Config) -> OperationRegistry {
    let ctx = HandlerContext::new(
        dispatcher,
        RetryPolicy::from_config(&config.retry),
        config.batch.max_batch_size,
    );
    let mut registry = OperationRegistry::new();

    registry
        .register("event", "track", Arc::new(TrackHandler::new(ctx.clone())))
        .register("event", "trackBatch", Arc::new(TrackBatchHandler::new(ctx.clone())))
        .register("event", "import", Arc::new(ImportHandler::new(ctx.clone())));

    for operation in UpdateOperation::ALL {
        registry.register(
            "profile",
            operation_name(operation),
            Arc::new(ProfileUpdateHandler::new(ctx.clone(), operation)),
        );
    }
    for operation in UpdateOperation::GROUP {
        registry.register(
            "group",
            operation_name(operation),
            Arc::new(GroupUpdateHandler::new(ctx.clone(), operation)),
        );
    }

    for endpoint in QueryEndpoint::ALL {
        registry.register("query", endpoint.name, Arc::new(QueryHandler::new(ctx.clone(), endpoint)));
    }
    registry
        .register("query", "jql", Arc::new(JqlHandler::new(ctx.clone())))
        .register("query", "profiles", Arc::new(ProfileQueryHandler::new(ctx.clone())))
        .register("export", "events", Arc::new(ExportHandler::new(ctx.clone())))
        .register("lookupTable", "list", Arc::new(LookupTableListHandler::new(ctx.clone())))
        .register("lookupTable", "replace", Arc::new(LookupTableReplaceHandler::new(ctx)));

    registry
}

/// Operation name as exposed in the registry (`setOnce`, not `$set_once`).
pub const fn operation_name(operation: UpdateOperation) -> &'static str {
    match operation {
        UpdateOperation::Set => "set",
        UpdateOperation::SetOnce => "setOnce",
        UpdateOperation::Add => "add",
        UpdateOperation::Append => "append",
        UpdateOperation::Union => "union",
        UpdateOperation::Remove => "remove",
        UpdateOperation::Unset => "unset",
        UpdateOperation::Delete => "delete",
    }
}

#[cfg(test)]
mod tests {
    use mixpanel_domain::Credentials;

    use super::*;

    #[test]
    fn registry_covers_every_operation() {
        let config = Config::new(Credentials::new("tok", "sec"));
        let dispatcher = Arc::new(RequestDispatcher::new(&config).unwrap());
        let registry = build_registry(dispatcher, &config);

        for (resource, operation) in [
            ("event", "track"),
            ("event", "trackBatch"),
            ("event", "import"),
            ("profile", "setOnce"),
            ("profile", "delete"),
            ("group", "unset"),
            ("query", "insights"),
            ("query", "funnels"),
            ("query", "retention"),
            ("query", "segmentation"),
            ("query", "jql"),
            ("query", "cohorts"),
            ("query", "cohortsList"),
            ("query", "profiles"),
            ("export", "events"),
            ("lookupTable", "list"),
            ("lookupTable", "replace"),
        ] {
            assert!(registry.contains(resource, operation), "{resource}/{operation} missing");
        }

        assert!(!registry.contains("group", "add"));
        assert!(!registry.contains("group", "append"));
        assert_eq!(registry.len(), 3 + 8 + 6 + 8 + 1 + 2);
    }
}
