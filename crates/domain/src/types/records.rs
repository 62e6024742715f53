//! Wire-shaped records
//!
//! Records are built fresh per invocation and never outlive a dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_wire_str_conversions;

/// A JSON object as it travels on the wire.
pub type Record = Map<String, Value>;

/// A trackable action: `{"event": ..., "properties": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: String,
    pub properties: Record,
}

impl EventRecord {
    pub fn new(event: impl Into<String>, properties: Record) -> Self {
        Self { event: event.into(), properties }
    }

    /// Convert into a JSON value for a request body.
    pub fn into_value(self) -> Value {
        let mut record = Record::new();
        record.insert("event".into(), Value::String(self.event));
        record.insert("properties".into(), Value::Object(self.properties));
        Value::Object(record)
    }
}

/// Profile/group update operation keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateOperation {
    #[serde(rename = "$set")]
    Set,
    #[serde(rename = "$set_once")]
    SetOnce,
    #[serde(rename = "$add")]
    Add,
    #[serde(rename = "$append")]
    Append,
    #[serde(rename = "$union")]
    Union,
    #[serde(rename = "$remove")]
    Remove,
    #[serde(rename = "$unset")]
    Unset,
    #[serde(rename = "$delete")]
    Delete,
}

impl_wire_str_conversions!(UpdateOperation {
    Set => "$set",
    SetOnce => "$set_once",
    Add => "$add",
    Append => "$append",
    Union => "$union",
    Remove => "$remove",
    Unset => "$unset",
    Delete => "$delete",
});

impl UpdateOperation {
    pub const ALL: [Self; 8] = [
        Self::Set,
        Self::SetOnce,
        Self::Add,
        Self::Append,
        Self::Union,
        Self::Remove,
        Self::Unset,
        Self::Delete,
    ];

    /// Operations accepted by the groups endpoint.
    pub const GROUP: [Self; 6] =
        [Self::Set, Self::SetOnce, Self::Union, Self::Remove, Self::Unset, Self::Delete];
}
