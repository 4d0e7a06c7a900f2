//! Options and reports for mutating passes

use std::fmt;

use serde::{Deserialize, Serialize};
use verstamp_content::{ChangeKind, VersionRecord};

use crate::classify::Classification;
use crate::store::{WriteAction, WriteOutcome};

/// Options for a mutating pass
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute and report the change without writing or backing up anything
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// The command behind a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "kind", rename_all = "lowercase")]
pub enum Operation {
    Increment(ChangeKind),
    Prepare(ChangeKind),
    Set,
    Inject,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increment(kind) => write!(f, "increment {kind}"),
            Self::Prepare(kind) => write!(f, "prepare {kind}"),
            Self::Set => f.write_str("set"),
            Self::Inject => f.write_str("inject"),
        }
    }
}

/// Result of a mutating pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub operation: Operation,
    /// Record before the pass
    pub previous: VersionRecord,
    /// Record after the pass (or that would be written, for dry runs)
    pub record: VersionRecord,
    pub classification: Classification,
    pub outcomes: Vec<WriteOutcome>,
    pub dry_run: bool,
}

impl SyncReport {
    /// Paths whose contents changed (or would change).
    pub fn written(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.action == WriteAction::Written)
            .map(|o| o.path.as_str())
            .collect()
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.action == WriteAction::Skipped)
            .map(|o| o.path.as_str())
            .collect()
    }

    pub fn release_advised(&self) -> bool {
        self.classification.release_advised
    }
}
