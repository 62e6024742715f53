//! Credentials for the analytics service

use std::fmt;

use serde::{Deserialize, Serialize};

use super::region::Region;
use crate::errors::{MixpanelError, Result};

/// Service-account credential pair used for management-plane calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub username: String,
    pub secret: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Access to one analytics project.
///
/// Token and secret are always required; the service account is only needed
/// for management-API calls and is checked when such a call is dispatched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub project_token: String,
    pub project_secret: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,
    #[serde(default)]
    pub region: Region,
}

impl Credentials {
    /// Create credentials for the default region without a service account.
    pub fn new(project_token: impl Into<String>, project_secret: impl Into<String>) -> Self {
        Self {
            project_token: project_token.into(),
            project_secret: project_secret.into(),
            project_id: None,
            service_account: None,
            region: Region::default(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_service_account(
        mut self,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.service_account =
            Some(ServiceAccount { username: username.into(), secret: secret.into() });
        self
    }

    /// Check the required fields.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` when the token or secret is blank, or
    /// when a service account is present with a blank field.
    pub fn validate(&self) -> Result<()> {
        if self.project_token.trim().is_empty() {
            return Err(MixpanelError::Config("project token is required".into()));
        }
        if self.project_secret.trim().is_empty() {
            return Err(MixpanelError::Config("project secret is required".into()));
        }
        if let Some(account) = &self.service_account {
            if account.username.trim().is_empty() || account.secret.trim().is_empty() {
                return Err(MixpanelError::Config(
                    "service account username and secret must both be set".into(),
                ));
            }
        }
        Ok(())
    }

    /// The service account, or a configuration error when it is absent.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` if no service account is configured.
    pub fn require_service_account(&self) -> Result<&ServiceAccount> {
        self.service_account.as_ref().ok_or_else(|| {
            MixpanelError::Config(
                "service account username and secret are required for this operation".into(),
            )
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("project_token", &self.project_token)
            .field("project_secret", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("service_account", &self.service_account)
            .field("region", &self.region)
            .finish()
    }
}
