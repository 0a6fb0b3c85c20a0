//! Time utilities: database timestamp encoding, elapsed-time formatting.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamps are stored as UTC text in this shape.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn to_db(ts: &DateTime<Utc>) -> String {
    ts.format(DB_FORMAT).to_string()
}

/// Parse a stored timestamp. Rows written by older tools may carry an ISO
/// `T` separator or a full RFC 3339 offset, both are accepted.
pub fn from_db(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for fmt in [DB_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Current time truncated to whole seconds, the precision of the store.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// `Xh Ym Zs`, used for cycle durations in history exports.
pub fn format_duration_ms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
