//! A single recorded clipboard value.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Wire format of the `recorded` field (UTC, second precision).
pub const RECORDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One clipboard snapshot and the time it was first observed.
///
/// Entries are immutable once created; the store only prepends or drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    value: String,
    #[serde(with = "recorded_format")]
    recorded: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry, truncating `recorded_at` to whole seconds.
    pub fn new(value: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            recorded: recorded_at.trunc_subsecs(0),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded
    }

    /// The timestamp as it appears in the history file.
    pub fn recorded_label(&self) -> String {
        self.recorded.format(RECORDED_FORMAT).to_string()
    }
}

/// Parse a `recorded` string.
///
/// Accepts the canonical format, the same with fractional seconds and
/// trailing whitespace (as written by older listeners), and RFC 3339.
pub fn parse_recorded(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc().trunc_subsecs(0));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
}

mod recorded_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{RECORDED_FORMAT, parse_recorded};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(RECORDED_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_recorded(&raw).ok_or_else(|| D::Error::custom(format!("invalid recorded timestamp: {raw:?}")))
    }
}
