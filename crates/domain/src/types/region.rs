//! Data-residency regions and API families

use serde::{Deserialize, Serialize};

use crate::impl_wire_str_conversions;

/// Data-residency zone selecting the set of endpoints a project must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Eu,
    In,
}

impl_wire_str_conversions!(Region {
    Us => "us",
    Eu => "eu",
    In => "in",
});

impl Region {
    /// All supported regions.
    pub const ALL: [Self; 3] = [Self::Us, Self::Eu, Self::In];
}

/// Which URL and auth rules apply to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFamily {
    /// `/track`, `/import`, `/engage`, `/groups`
    Ingestion,
    /// `/2.0/...` query endpoints
    Query,
    /// Raw event export
    Export,
    /// Management endpoints authenticated with a service account
    ServiceAccount,
}

impl_wire_str_conversions!(ApiFamily {
    Ingestion => "ingestion",
    Query => "query",
    Export => "export",
    ServiceAccount => "service_account",
});

impl ApiFamily {
    /// All API families.
    pub const ALL: [Self; 4] = [Self::Ingestion, Self::Query, Self::Export, Self::ServiceAccount];
}
