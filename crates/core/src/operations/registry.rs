//! Operation registry
//!
//! Maps a `(resource, operation)` pair to a handler. The registry is built
//! once at start-up; adding an operation is a registration, not a new branch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mixpanel_domain::{MixpanelError, Result};
use serde_json::Value;
use tracing::{debug, instrument};

use super::params::OperationParams;

/// Executes a single resource operation.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Run the operation and return one output item per logical result.
    async fn execute(&self, params: &OperationParams) -> Result<Vec<Value>>;
}

/// Registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    pub resource: String,
    pub operation: String,
}

impl OperationKey {
    pub fn new(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self { resource: resource.into(), operation: operation.into() }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource, self.operation)
    }
}

/// Lookup table from operation keys to handlers.
#[derive(Default, Clone)]
pub struct OperationRegistry {
    handlers: HashMap<OperationKey, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same key.
    pub fn register(
        &mut self,
        resource: &str,
        operation: &str,
        handler: Arc<dyn OperationHandler>,
    ) -> &mut Self {
        self.handlers.insert(OperationKey::new(resource, operation), handler);
        self
    }

    pub fn get(&self, resource: &str, operation: &str) -> Option<Arc<dyn OperationHandler>> {
        self.handlers.get(&OperationKey::new(resource, operation)).cloned()
    }

    pub fn contains(&self, resource: &str, operation: &str) -> bool {
        self.handlers.contains_key(&OperationKey::new(resource, operation))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<OperationKey> {
        let mut keys: Vec<OperationKey> = self.handlers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Look up and run an operation.
    ///
    /// # Errors
    /// Returns `MixpanelError::UnknownOperation` when nothing is registered
    /// for the pair, otherwise whatever the handler returns.
    #[instrument(skip(self, params))]
    pub async fn execute(
        &self,
        resource: &str,
        operation: &str,
        params: &OperationParams,
    ) -> Result<Vec<Value>> {
        let handler = self.get(resource, operation).ok_or_else(|| {
            MixpanelError::UnknownOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            }
        })?;
        let items = handler.execute(params).await?;
        debug!(items = items.len(), "operation completed");
        Ok(items)
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry").field("operations", &self.keys()).finish()
    }
}
