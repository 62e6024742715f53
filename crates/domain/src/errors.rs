//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Mixpanel operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MixpanelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A caller-supplied JSON field could not be parsed or has the wrong shape.
    #[error("Invalid payload in field '{field}': {message}")]
    InvalidPayload { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Non-2xx response that is not covered by a more specific variant.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The service answered with a body that does not match its wire contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A batch failed; earlier batches were already accepted by the service.
    #[error("Batch {index} of {total} failed: {message}")]
    Batch { index: usize, total: usize, message: String },

    #[error("Unknown operation: {resource}/{operation}")]
    UnknownOperation { resource: String, operation: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MixpanelError {
    /// Shorthand for [`MixpanelError::InvalidPayload`].
    pub fn invalid_payload(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload { field: field.into(), message: message.into() }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::RateLimited(_) => "rate_limited",
            Self::Api { .. } => "api",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Protocol(_) => "protocol",
            Self::Batch { .. } => "batch",
            Self::UnknownOperation { .. } => "unknown_operation",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Mixpanel operations
pub type Result<T> = std::result::Result<T, MixpanelError>;
