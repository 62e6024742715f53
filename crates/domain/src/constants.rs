//! Service constants
//!
//! Wire paths, limits and defaults shared by the core and infra crates.

// Timestamp classification: values below this are seconds, the rest milliseconds.
pub const MILLISECOND_THRESHOLD: i64 = 10_000_000_000;

// Batching
pub const MAX_INGESTION_BATCH_SIZE: usize = 2000;
pub const DEFAULT_MAX_BATCH_SIZE: usize = MAX_INGESTION_BATCH_SIZE;

// Retry defaults
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

// Timeouts (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_USER_AGENT: &str = concat!("mixpanel-bridge/", env!("CARGO_PKG_VERSION"));

// Ingestion paths
pub const PATH_TRACK: &str = "/track";
pub const PATH_IMPORT: &str = "/import";
pub const PATH_ENGAGE: &str = "/engage";
pub const PATH_GROUPS: &str = "/groups";

// Query / service-account paths
pub const PATH_INSIGHTS: &str = "/2.0/insights";
pub const PATH_FUNNELS: &str = "/2.0/funnels";
pub const PATH_RETENTION: &str = "/2.0/retention";
pub const PATH_SEGMENTATION: &str = "/2.0/segmentation";
pub const PATH_JQL: &str = "/2.0/jql";
pub const PATH_COHORTS: &str = "/2.0/cohorts";
pub const PATH_COHORTS_LIST: &str = "/2.0/cohorts/list";
pub const PATH_LOOKUP_TABLES: &str = "/2.0/lookup-tables";
pub const PATH_ENGAGE_QUERY: &str = "/2.0/engage";

// Event property keys
pub const PROP_TOKEN: &str = "token";
pub const PROP_DISTINCT_ID: &str = "distinct_id";
pub const PROP_INSERT_ID: &str = "$insert_id";
pub const PROP_TIME: &str = "time";
pub const PROP_IP: &str = "ip";

// Profile / group envelope keys
pub const ENVELOPE_TOKEN: &str = "$token";
pub const ENVELOPE_DISTINCT_ID: &str = "$distinct_id";
pub const ENVELOPE_GROUP_KEY: &str = "$group_key";
pub const ENVELOPE_GROUP_ID: &str = "$group_id";
pub const ENVELOPE_IP: &str = "$ip";
pub const ENVELOPE_IGNORE_TIME: &str = "$ignore_time";

/// Pagination fields copied onto every item of a paginated response.
pub const PAGINATION_FIELDS: &[&str] = &["page", "page_size", "session_id", "total"];
