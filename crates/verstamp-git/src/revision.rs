//! Short revision of the checked-out commit

use std::path::Path;

use git2::{ErrorCode, Repository};

use crate::{Error, Result};

/// Minimum abbreviation length, matching `git rev-parse --short`.
pub const DEFAULT_ABBREV: usize = 7;

/// Short id of `HEAD` for the repository enclosing `path`.
///
/// The abbreviation grows past [`DEFAULT_ABBREV`] when needed to stay
/// unambiguous within the object database.
pub fn short_revision(path: &Path) -> Result<String> {
    let repo = Repository::discover(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: path.to_path_buf(),
        },
        _ => Error::Git(e),
    })?;

    let head = repo.head().map_err(|e| match e.code() {
        ErrorCode::UnbornBranch | ErrorCode::NotFound => Error::NoCommits {
            path: path.to_path_buf(),
        },
        _ => Error::Git(e),
    })?;

    let commit = head.peel_to_commit()?;
    let short = commit.as_object().short_id()?;
    let short = short.as_str().unwrap_or_default().to_string();

    // libgit2 honours core.abbrev, which may be shorter than our minimum
    let full = commit.id().to_string();
    let revision = if short.len() < DEFAULT_ABBREV {
        full[..DEFAULT_ABBREV].to_string()
    } else {
        short
    };

    tracing::debug!(revision = %revision, "resolved source revision");
    Ok(revision)
}
