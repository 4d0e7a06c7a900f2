//! The logical version record and the partial view one file holds of it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::build_id::BuildId;
use crate::version::SemanticVersion;

/// Revision recorded when source control cannot be queried.
pub const UNKNOWN_REVISION: &str = "unknown";

/// The single source of truth for a product's version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub semantic: SemanticVersion,
    pub build: BuildId,
    /// ISO-8601 UTC, present only when `build` is a real stamp.
    pub timestamp: Option<String>,
    pub revision: Option<String>,
}

impl VersionRecord {
    /// Record with no derived fields.
    pub fn new(semantic: SemanticVersion, build: BuildId) -> Self {
        Self {
            semantic,
            build,
            timestamp: None,
            revision: None,
        }
    }

    /// Fill in the timestamp from the build identifier and attach a revision.
    pub fn derive(mut self, revision: Option<String>) -> Self {
        self.timestamp = self.build.timestamp();
        self.revision = revision;
        self
    }

    /// `MAJOR.MINOR.PATCH+BUILD`
    pub fn full(&self) -> String {
        format!("{}+{}", self.semantic, self.build)
    }

    pub fn revision_or_unknown(&self) -> &str {
        self.revision.as_deref().unwrap_or(UNKNOWN_REVISION)
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

/// The version-bearing fields found in one representation.
///
/// Formats carry different subsets of the record, so every field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFields {
    pub semantic: Option<SemanticVersion>,
    pub build: Option<BuildId>,
    pub timestamp: Option<String>,
    pub revision: Option<String>,
}

impl VersionFields {
    /// Describe how these fields disagree with `record`, if they do.
    ///
    /// Revisions are not compared: they are best-effort and not every
    /// representation carries one.
    pub fn mismatches(&self, record: &VersionRecord) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(semantic) = &self.semantic {
            if *semantic != record.semantic {
                problems.push(format!(
                    "semantic version {} differs from {}",
                    semantic, record.semantic
                ));
            }
        }

        if let Some(build) = &self.build {
            if *build != record.build {
                problems.push(format!(
                    "build identifier {} differs from {}",
                    build, record.build
                ));
            }
        }

        if let Some(timestamp) = &self.timestamp {
            let build = self.build.as_ref().unwrap_or(&record.build);
            if !build.is_pending() && !build.matches_timestamp(timestamp) {
                problems.push(format!(
                    "build timestamp {} does not match build identifier {}",
                    timestamp, build
                ));
            }
        }

        problems
    }
}

impl From<&VersionRecord> for VersionFields {
    fn from(record: &VersionRecord) -> Self {
        Self {
            semantic: Some(record.semantic),
            build: Some(record.build.clone()),
            timestamp: record.timestamp.clone(),
            revision: record.revision.clone(),
        }
    }
}
