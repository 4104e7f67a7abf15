//! Bundle versioning utilities
//!
//! Archives are named `{bundle_id}_{version}.v{qualifier}.jar`, where the
//! qualifier is the creation time formatted as `YYYYMMDD-HHMM`.

use chrono::{Local, NaiveDateTime};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of the timestamp qualifier
pub const QUALIFIER_FORMAT: &str = "%Y%m%d-%H%M";

/// Base version of every generated bundle
pub const BASE_VERSION: Version = Version::new(1, 0, 0);

/// Source of the wall-clock time used for version qualifiers
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A qualified bundle version (e.g., "1.0.0.v20240301-1015")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleVersion {
    /// Semantic base version
    pub version: Version,
    /// Timestamp qualifier
    pub qualifier: String,
    /// When the version was stamped
    pub timestamp: NaiveDateTime,
}

impl BundleVersion {
    /// Stamp the base version with a timestamp
    pub fn from_timestamp(timestamp: NaiveDateTime) -> Self {
        Self {
            version: BASE_VERSION,
            qualifier: timestamp.format(QUALIFIER_FORMAT).to_string(),
            timestamp,
        }
    }

    /// Stamp the base version with the clock's current time
    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_timestamp(clock.now())
    }

    /// Full version string as written to the bundle descriptor
    pub fn version_string(&self) -> String {
        self.to_string()
    }

    /// Archive file name for a bundle
    pub fn archive_name(&self, bundle_id: &str) -> String {
        format!("{}_{}.jar", bundle_id, self)
    }
}

impl fmt::Display for BundleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v{}", self.version, self.qualifier)
    }
}
