use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner recorded when a candidate matches no known URL shape.
pub const OWNER_UNKNOWN: &str = "unknown";
/// Owner recorded for short-link candidates; the real owner sits behind a redirect.
pub const OWNER_SHORT_URL: &str = "short_url";

/// One discovered item. Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub source_url: String,
    pub owner: String,
    pub identity: String,
    pub discovery_query: String,
    /// Set once at first observation.
    pub discovered_at: DateTime<Utc>,
}
