//! Consistency check across representations

use serde::{Deserialize, Serialize};
use verstamp_content::VersionRecord;

use crate::store::RepresentationKind;

/// Overall consistency of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Every present representation agrees with the manifest
    Healthy,
    /// Consistent, but the build identifier is still the sentinel
    Pending,
    /// Some representation disagrees with the manifest
    Drifted,
    /// The manifest or a representation cannot be read, or a pass was interrupted
    Broken,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Pending => "pending",
            Self::Drifted => "drifted",
            Self::Broken => "broken",
        }
    }
}

/// A representation that disagrees with the manifest or cannot be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftItem {
    pub kind: RepresentationKind,
    pub path: String,
    pub description: String,
}

/// Report from a consistency check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    /// The manifest's record, when it could be read
    pub record: Option<VersionRecord>,
    pub drifted: Vec<DriftItem>,
    pub messages: Vec<String>,
}

impl CheckReport {
    /// A report for a record with no issues.
    pub fn healthy(record: VersionRecord) -> Self {
        let status = if record.build.is_pending() {
            CheckStatus::Pending
        } else {
            CheckStatus::Healthy
        };
        Self {
            status,
            record: Some(record),
            drifted: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A report for a project whose manifest cannot be read.
    pub fn broken(message: String) -> Self {
        Self {
            status: CheckStatus::Broken,
            record: None,
            drifted: Vec::new(),
            messages: vec![message],
        }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self.status, CheckStatus::Healthy | CheckStatus::Pending)
    }

    /// Record a disagreement. Never improves the status.
    pub fn drift(&mut self, item: DriftItem) {
        self.drifted.push(item);
        if self.status != CheckStatus::Broken {
            self.status = CheckStatus::Drifted;
        }
    }

    /// Record an unreadable representation or an interrupted pass.
    pub fn break_with(&mut self, message: String) {
        self.messages.push(message);
        self.status = CheckStatus::Broken;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verstamp_content::{BuildId, SemanticVersion};

    fn record(build: &str) -> VersionRecord {
        VersionRecord::new(SemanticVersion::new(1, 0, 0), BuildId::parse(build).unwrap())
    }

    fn item() -> DriftItem {
        DriftItem {
            kind: RepresentationKind::DataFile,
            path: "assets/version.json".to_string(),
            description: "semantic version 0.9.0 differs from 1.0.0".to_string(),
        }
    }

    #[test]
    fn pending_record_is_pending_not_healthy() {
        assert_eq!(CheckReport::healthy(record("202501010000")).status, CheckStatus::Healthy);
        let pending = CheckReport::healthy(record(verstamp_content::SENTINEL));
        assert_eq!(pending.status, CheckStatus::Pending);
        assert!(pending.is_consistent());
    }

    #[test]
    fn drift_then_break_is_broken() {
        let mut report = CheckReport::healthy(record("202501010000"));
        report.drift(item());
        assert_eq!(report.status, CheckStatus::Drifted);
        report.break_with("unreadable".to_string());
        report.drift(item());
        assert_eq!(report.status, CheckStatus::Broken);
        assert_eq!(report.drifted.len(), 2);
        assert!(!report.is_consistent());
    }
}
