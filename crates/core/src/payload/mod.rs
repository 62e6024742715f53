//! Payload builders
//!
//! Pure functions producing wire-shaped records. Every builder finishes with
//! [`clean_record`].

pub mod clean;
pub mod event;
pub mod update;

pub use clean::{clean_record, clean_value};
pub use event::{build_event, build_event_properties, EventOptions};
pub use update::{build_group_update, build_profile_update, ProfileOptions, DELETE_PAYLOAD};
