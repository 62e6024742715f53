//! Conversions from external infrastructure errors into [`ApiError`].

use std::time::Duration;

use reqwest::Error as HttpError;

use crate::api::errors::ApiError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Classify a transport failure. `timeout` is the bound that was applied to
/// the request and is reported back on timeouts.
pub fn map_reqwest_error(err: HttpError, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(timeout);
    }

    if err.is_connect() {
        return ApiError::Network(format!("connection failure: {err}"));
    }

    if err.is_builder() {
        return ApiError::Config(format!("invalid request: {err}"));
    }

    if err.is_decode() || err.is_body() {
        return ApiError::Protocol(format!("failed to read response body: {err}"));
    }

    if let Some(status) = err.status() {
        let code = status.as_u16();
        let message = format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

        return match code {
            401 | 403 => ApiError::Auth(message),
            402 => ApiError::Billing(message),
            429 => ApiError::RateLimit(message),
            500..=599 => ApiError::Server { status: code, message },
            _ => ApiError::Client { status: code, message },
        };
    }

    ApiError::Network(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Protocol(format!("invalid JSON: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
