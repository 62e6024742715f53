//! Domain types and models

pub mod credentials;
pub mod records;
pub mod region;

pub use credentials::{Credentials, ServiceAccount};
pub use records::{EventRecord, Record, UpdateOperation};
pub use region::{ApiFamily, Region};
