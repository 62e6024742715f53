//! Resource/operation dispatch

pub mod params;
pub mod registry;

pub use params::OperationParams;
pub use registry::{OperationHandler, OperationKey, OperationRegistry};
