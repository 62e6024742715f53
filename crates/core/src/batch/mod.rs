//! Batch planning for ingestion payloads

pub mod planner;

pub use planner::{split, Batch};
