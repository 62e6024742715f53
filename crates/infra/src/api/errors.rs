//! API-specific error types
//!
//! Provides error classification for dispatch operations with retry metadata.

use std::time::Duration;

use mixpanel_domain::MixpanelError;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Bad credentials (401, 403)
    Authentication,
    /// Rate limiting (429) - the only retryable category
    RateLimit,
    /// Billing required (402)
    Billing,
    /// Server errors (5xx) - fatal at this layer
    Server,
    /// Malformed requests and rejected payloads
    Client,
    /// Connection failures and timeouts
    Network,
    /// Missing or invalid configuration
    Config,
    /// Response body does not match the wire contract
    Protocol,
}

/// API operation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Billing required: {0}")]
    Billing(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// The ingestion endpoint answered `0` or a verbose failure.
    #[error("Payload rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Billing(_) => ApiErrorCategory::Billing,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } | Self::Rejected(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
            Self::Protocol(_) => ApiErrorCategory::Protocol,
        }
    }

    /// Only rate limiting is retried; every other failure is fatal.
    pub fn should_retry(&self) -> bool {
        self.category() == ApiErrorCategory::RateLimit
    }

    /// HTTP status behind this error, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::RateLimit(_) => Some(429),
            Self::Billing(_) => Some(402),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::Rejected(_) => Some(200),
            Self::Network(_) | Self::Timeout(_) | Self::Config(_) | Self::Protocol(_) => None,
        }
    }
}

impl From<ApiError> for MixpanelError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(message) => Self::Auth(message),
            ApiError::RateLimit(message) => Self::RateLimited(message),
            ApiError::Billing(message) => Self::Api { status: 402, message },
            ApiError::Server { status, message } | ApiError::Client { status, message } => {
                Self::Api { status, message }
            }
            ApiError::Rejected(message) => Self::Api { status: 200, message },
            ApiError::Network(message) => Self::Network(message),
            ApiError::Timeout(duration) => Self::Timeout(format!("request timed out after {duration:?}")),
            ApiError::Config(message) => Self::Config(message),
            ApiError::Protocol(message) => Self::Protocol(message),
        }
    }
}

/// Convert domain errors raised inside the transport layer
impl From<MixpanelError> for ApiError {
    fn from(err: MixpanelError) -> Self {
        match err {
            MixpanelError::Config(message) => Self::Config(message),
            MixpanelError::Auth(message) => Self::Auth(message),
            MixpanelError::RateLimited(message) => Self::RateLimit(message),
            MixpanelError::Network(message) | MixpanelError::Timeout(message) => {
                Self::Network(message)
            }
            MixpanelError::Api { status, message } if status >= 500 => {
                Self::Server { status, message }
            }
            MixpanelError::Api { status, message } => Self::Client { status, message },
            MixpanelError::Protocol(message) => Self::Protocol(message),
            other => Self::Client { status: 0, message: other.to_string() },
        }
    }
}
