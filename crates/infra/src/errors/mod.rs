//! Conversions from external infrastructure errors into transport errors.

mod conversions;

pub use conversions::map_reqwest_error;
