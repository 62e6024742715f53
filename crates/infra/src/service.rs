//! Service facade
//!
//! Owns the operation registry and the process's [`LicenseNotice`]. Hosts
//! create one `MixpanelService` at start-up and route every
//! `(resource, operation)` call through [`MixpanelService::execute`].

use std::sync::Arc;

use mixpanel_core::{LicenseNotice, OperationKey, OperationParams, OperationRegistry};
use mixpanel_domain::{Config, Result};
use serde_json::Value;
use tracing::instrument;

use crate::api::RequestDispatcher;
use crate::handlers::build_registry;

pub struct MixpanelService {
    registry: OperationRegistry,
    notice: LicenseNotice,
}

impl MixpanelService {
    /// Validate `config` and build the dispatcher and registry.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` for invalid configuration or an HTTP
    /// client that cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let dispatcher = Arc::new(RequestDispatcher::new(config)?);
        Ok(Self::with_registry(build_registry(dispatcher, config)))
    }

    pub fn with_registry(registry: OperationRegistry) -> Self {
        Self { registry, notice: LicenseNotice::new() }
    }

    /// Supported operations, sorted.
    pub fn operations(&self) -> Vec<OperationKey> {
        self.registry.keys()
    }

    /// Run one operation. The license notice is logged on first use.
    #[instrument(skip(self, params))]
    pub async fn execute(
        &mut self,
        resource: &str,
        operation: &str,
        params: &OperationParams,
    ) -> Result<Vec<Value>> {
        self.notice.emit_once();
        self.registry.execute(resource, operation, params).await
    }

    pub fn notice_emitted(&self) -> bool {
        self.notice.has_emitted()
    }
}

impl std::fmt::Debug for MixpanelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixpanelService")
            .field("operations", &self.registry.len())
            .field("notice", &self.notice)
            .finish()
    }
}
