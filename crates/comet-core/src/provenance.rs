//! Provenance stamped into parameter files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of a persisted payload layout, rendered as `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when readers of older files break.
    pub major: u32,
    /// Bumped when fields are added.
    pub minor: u32,
    /// Bumped for fixes that keep the layout.
    pub patch: u32,
}

impl SchemaVersion {
    /// Layout written by this release.
    pub const CURRENT: SchemaVersion = SchemaVersion::new(1, 0, 0);

    /// Creates a version triple.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Files sharing a major version can be read by this release.
    pub fn is_compatible_with(self, other: SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Where a run's results came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hex SHA-256 of the mutation matrix bytes.
    pub input_hash: String,
    /// Master seed of the run.
    pub seed: u64,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    /// Crate name to version.
    #[serde(default)]
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Provenance for one input hash and seed, stamped at `created_at`.
    pub fn new(input_hash: impl Into<String>, seed: u64, created_at: impl Into<String>) -> Self {
        Self {
            input_hash: input_hash.into(),
            seed,
            created_at: created_at.into(),
            tool_versions: BTreeMap::new(),
        }
    }

    /// Records a tool name and version.
    pub fn with_tool(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.tool_versions.insert(name.into(), version.into());
        self
    }
}
