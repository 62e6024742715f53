//! Configuration structures
//!
//! Loading lives in `mixpanel-infra`; this module only defines the shape and
//! its validation rules.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EXPORT_TIMEOUT_SECS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_USER_AGENT,
    MAX_INGESTION_BATCH_SIZE,
};
use crate::errors::{MixpanelError, Result};
use crate::types::{ApiFamily, Credentials};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub credentials: Credentials,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Configuration with defaults for everything but the credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            transport: TransportConfig::default(),
            retry: RetryConfig::default(),
            batch: BatchConfig::default(),
            endpoints: EndpointOverrides::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate every section.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        self.transport.validate()?;
        self.retry.validate()?;
        self.batch.validate()?;
        Ok(())
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub request_timeout_secs: u64,
    /// Export payloads can be large and streamed, so they get a longer timeout.
    pub export_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            export_timeout_secs: DEFAULT_EXPORT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    /// Timeout that applies to a call of the given family.
    pub fn timeout_for(&self, family: ApiFamily) -> Duration {
        match family {
            ApiFamily::Export => self.export_timeout(),
            ApiFamily::Ingestion | ApiFamily::Query | ApiFamily::ServiceAccount => {
                self.request_timeout()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 || self.export_timeout_secs == 0 {
            return Err(MixpanelError::Config("timeouts must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Retry settings for rate-limited batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS, base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(MixpanelError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Batch planning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_batch_size: DEFAULT_MAX_BATCH_SIZE }
    }
}

impl BatchConfig {
    fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 || self.max_batch_size > MAX_INGESTION_BATCH_SIZE {
            return Err(MixpanelError::Config(format!(
                "batch.max_batch_size must be between 1 and {MAX_INGESTION_BATCH_SIZE}, got {}",
                self.max_batch_size
            )));
        }
        Ok(())
    }
}

/// Optional base URL overrides per API family (proxies, tests)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointOverrides {
    pub ingestion: Option<String>,
    pub query: Option<String>,
    pub export: Option<String>,
}

impl EndpointOverrides {
    /// Override for a family; service-account calls reuse the query override.
    pub fn for_family(&self, family: ApiFamily) -> Option<&str> {
        match family {
            ApiFamily::Ingestion => self.ingestion.as_deref(),
            ApiFamily::Query | ApiFamily::ServiceAccount => self.query.as_deref(),
            ApiFamily::Export => self.export.as_deref(),
        }
    }

    /// Point every family at the same base URL.
    pub fn all(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            ingestion: Some(base_url.clone()),
            query: Some(base_url.clone()),
            export: Some(base_url),
        }
    }
}

/// Logging bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
