//! # Mixpanel Core
//!
//! Pure transport-layer logic - no HTTP, no filesystem.
//!
//! This crate contains:
//! - Endpoint resolution per region and API family
//! - Timestamp normalization and insert-id generation
//! - Payload builders and record cleaning
//! - Batch planning
//! - Response normalization for the three response encodings
//! - The operation registry and its handler trait
//!
//! ## Architecture Principles
//! - Only depends on `mixpanel-domain`
//! - All network effects live behind `OperationHandler` implementations in
//!   `mixpanel-infra`

pub mod batch;
pub mod endpoints;
pub mod idempotency;
pub mod normalize;
pub mod notice;
pub mod operations;
pub mod payload;
pub mod timestamp;

pub use batch::{split, Batch};
pub use endpoints::{default_base_url, EndpointResolver};
pub use normalize::{normalize_export, normalize_export_text, normalize_query, IngestionOutcome};
pub use notice::LicenseNotice;
pub use operations::{OperationHandler, OperationKey, OperationParams, OperationRegistry};
pub use payload::{
    build_event, build_event_properties, build_group_update, build_profile_update, clean_record,
    EventOptions, ProfileOptions,
};
