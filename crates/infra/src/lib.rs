//! # Mixpanel Infrastructure
//!
//! Network-facing implementations on top of `mixpanel-core`.
//!
//! This crate contains:
//! - The reqwest-based HTTP client and request dispatcher
//! - Auth schemes, retry policy and the sequential batch forwarder
//! - Operation handlers and the registry builder
//! - Configuration loading and logging bootstrap
//!
//! ## Architecture
//! - Implements `OperationHandler` from `mixpanel-core`
//! - Depends on `mixpanel-domain` and `mixpanel-core`
//! - Contains all "impure" code (HTTP, environment, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod http;
pub mod observability;
pub mod service;

pub use api::{ApiError, ApiRequest, AuthScheme, BatchForwarder, RequestDispatcher, RetryPolicy};
pub use handlers::build_registry;
pub use http::HttpClient;
pub use observability::init_tracing;
pub use service::MixpanelService;
