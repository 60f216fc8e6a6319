use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single authoritative banner record. Mutation always replaces the whole
/// record; viewers only ever hold read-only snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerState {
    pub description: String,
    /// Scheme-less destination, e.g. "example.com/offer".
    pub link: String,
    pub visibility: bool,
    /// Absolute expiry instant, always UTC on the wire (RFC 3339).
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
}

impl BannerState {
    /// Record used on first start when no shadow file exists: hidden, empty,
    /// already expired.
    pub fn hidden_default(now: DateTime<Utc>) -> Self {
        Self {
            description: String::new(),
            link: String::new(),
            visibility: false,
            end_time: now,
        }
    }
}

/// POST /banner/add body. The duration fields are an offset from submission
/// time; they are signed so that negative input reaches validation instead of
/// failing opaquely at deserialization.
#[derive(Debug, Deserialize)]
pub struct SetBannerRequest {
    pub description: String,
    pub link: String,
    pub visibility: bool,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}
