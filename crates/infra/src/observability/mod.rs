//! Observability bootstrap
//!
//! All crates log through `tracing`; this module installs the subscriber.

pub mod logging;

pub use logging::{build_env_filter, init_tracing};
