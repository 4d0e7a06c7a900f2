//! Source revision lookup for derived fields

use std::path::PathBuf;

/// Where the short source revision comes from.
///
/// Lookups are best effort: `None` means the revision is unknown.
pub trait RevisionSource: Send + Sync {
    fn revision(&self) -> Option<String>;
}

/// Reads the revision of the git repository containing `root`.
#[derive(Debug, Clone)]
pub struct GitRevision {
    root: PathBuf,
}

impl GitRevision {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RevisionSource for GitRevision {
    fn revision(&self) -> Option<String> {
        match verstamp_git::short_revision(&self.root) {
            Ok(revision) => Some(revision),
            Err(e) => {
                tracing::warn!(error = %e, "source revision unavailable, recording \"unknown\"");
                None
            }
        }
    }
}

/// A fixed revision, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct FixedRevision(pub Option<String>);

impl FixedRevision {
    pub fn new(revision: impl Into<String>) -> Self {
        Self(Some(revision.into()))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl RevisionSource for FixedRevision {
    fn revision(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_revision_outside_a_repository_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(GitRevision::new(dir.path()).revision(), None);
    }

    #[test]
    fn git_revision_reads_head() {
        let dir = tempfile::tempdir().unwrap();
        verstamp_test_utils::git::real_git_repo_with_commit(dir.path());
        let revision = GitRevision::new(dir.path()).revision().unwrap();
        assert!(revision.len() >= 7);
    }
}
