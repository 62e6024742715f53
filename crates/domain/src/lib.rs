//! # Mixpanel Domain
//!
//! Domain types shared by the transport and batch-dispatch layers.
//!
//! This crate contains:
//! - Credentials, regions and API families
//! - Wire record types and update-operation keywords
//! - Error types and the `Result` alias
//! - Configuration structures and service constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
