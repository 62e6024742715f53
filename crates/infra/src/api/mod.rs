//! HTTP API layer for the analytics service
//!
//! - `dispatcher`: one HTTP call per request, region and auth resolved
//! - `auth`: the three credential schemes
//! - `retry`: rate-limit retry with exponential backoff
//! - `forwarder`: sequential batch dispatch for ingestion endpoints
//! - `errors`: transport error classification

pub mod auth;
pub mod dispatcher;
pub mod errors;
pub mod forwarder;
pub mod retry;

pub use auth::{Auth, AuthScheme};
pub use dispatcher::{map_status_error, ApiRequest, RequestBody, RequestDispatcher};
pub use errors::{ApiError, ApiErrorCategory};
pub use forwarder::BatchForwarder;
pub use retry::RetryPolicy;
