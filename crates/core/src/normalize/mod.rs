//! Response normalization
//!
//! Each API family answers in its own encoding; these functions turn every
//! one of them into a sequence of output items, one per logical result.

pub mod export;
pub mod ingestion;
pub mod query;

pub use export::{normalize_export, normalize_export_text};
pub use ingestion::IngestionOutcome;
pub use query::normalize_query;
