//! Timestamped object names for extracted payloads.

use std::fmt;

use chrono::{DateTime, Utc};

/// Name of an object written by the extractor: `data_<YYYYMMDD_HHMMSS>.json`.
///
/// Unique only at second granularity. Two extractions within the same
/// second produce the same name and the later write replaces the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    /// Builds the name for the given instant, truncated to seconds.
    #[must_use]
    pub fn for_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!("data_{}.json", at.format("%Y%m%d_%H%M%S")))
    }

    /// Builds the name for the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::for_timestamp(Utc::now())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.0
    }
}
