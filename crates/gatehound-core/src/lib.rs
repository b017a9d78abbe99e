pub mod dedup;
pub mod liveness;
pub mod tag;
pub mod timefmt;

use serde::{Deserialize, Serialize};

/// Body of a `POST /receive` tag event. The reader fills all three fields;
/// `timestamp` is RFC 3339 UTC at forward time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagEventPayload {
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// A tag event as the collector stores it. Same shape as the wire payload,
/// but `timestamp` has been rewritten into the display timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// Body of a `POST /gate_status` liveness ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateStatusPayload {
    #[serde(default)]
    pub gate_id: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
}
