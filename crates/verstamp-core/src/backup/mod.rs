//! Sidecar backups and the journal that tracks them
//!
//! Before a representation is first changed it is copied to a sidecar
//! (`<file>.verstamp.bak`) next to it. Sidecars persist across passes so that
//! `prepare` followed by `inject` can still be undone back to the state
//! before `prepare`. The journal lists every sidecar with its checksum and
//! says whether the last pass finished.

mod journal;

pub use journal::{Journal, JournalEntry, JournalState};

use serde::{Deserialize, Serialize};
use verstamp_fs::checksum::{compute_checksum, compute_file_checksum};
use verstamp_fs::{NormalizedPath, io};

use crate::config::{JOURNAL_FILE, STATE_DIR};
use crate::{Error, Result};

/// Backup state of one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupState {
    Clean,
    BackedUp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStatus {
    pub path: String,
    pub state: BackupState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

/// Backup state of a whole project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupReport {
    /// `None` when no journal exists
    pub journal: Option<JournalState>,
    pub files: Vec<BackupStatus>,
}

impl BackupReport {
    pub fn has_backups(&self) -> bool {
        self.files.iter().any(|f| f.state == BackupState::BackedUp)
    }
}

/// Manages sidecars and the journal for one project root.
#[derive(Debug, Clone)]
pub struct BackupManager {
    root: NormalizedPath,
    suffix: String,
    journal_path: NormalizedPath,
}

impl BackupManager {
    pub fn new(root: NormalizedPath, suffix: impl Into<String>) -> Self {
        let journal_path = root.join(STATE_DIR).join(JOURNAL_FILE);
        Self {
            root,
            suffix: suffix.into(),
            journal_path,
        }
    }

    pub fn journal_path(&self) -> &NormalizedPath {
        &self.journal_path
    }

    /// Sidecar path for a representation, relative to the root.
    pub fn sidecar(&self, path: &str) -> String {
        format!("{path}{}", self.suffix)
    }

    fn absolute(&self, path: &str) -> NormalizedPath {
        self.root.join(path)
    }

    pub fn journal(&self) -> Result<Option<Journal>> {
        Journal::load(&self.journal_path)
    }

    /// Fail if the last pass stopped while writing.
    pub fn ensure_settled(&self) -> Result<()> {
        match self.journal()? {
            Some(journal) if journal.state == JournalState::Writing => Err(Error::InterruptedRun {
                journal: self.journal_path.to_native(),
            }),
            _ => Ok(()),
        }
    }

    /// Back up every path in `paths` that has no sidecar yet and mark the
    /// journal as writing.
    ///
    /// The journal is saved before any sidecar is created, so every sidecar
    /// on disk is either journaled or picked up as an orphan by `restore`.
    pub fn begin(&self, paths: &[&str]) -> Result<Journal> {
        let mut journal = self.journal()?.unwrap_or_default();
        let mut pending = Vec::new();

        for path in paths {
            let live = self.absolute(path);
            if !live.is_file() || journal.entry(path).is_some() {
                continue;
            }
            let sidecar = live.with_suffix(&self.suffix);
            let checksum = if sidecar.is_file() {
                // Orphan from an interrupted pass: it predates the live file
                compute_file_checksum(&sidecar)?
            } else {
                let checksum = compute_file_checksum(&live)?;
                pending.push((live, sidecar.clone()));
                checksum
            };
            journal.push(JournalEntry {
                path: path.to_string(),
                backup: sidecar.relative_to(&self.root),
                checksum,
            });
        }

        journal.state = JournalState::Writing;
        journal.save(&self.journal_path)?;

        for (live, sidecar) in pending {
            io::copy_atomic(&live, &sidecar)?;
            tracing::debug!(backup = %sidecar, "created backup");
        }
        Ok(journal)
    }

    /// Mark the journal as settled after a completed pass.
    pub fn settle(&self, mut journal: Journal) -> Result<()> {
        journal.state = JournalState::Settled;
        journal.save(&self.journal_path)
    }

    /// Journaled sidecars plus orphan sidecars of `paths`, in journal order.
    fn collect(&self, paths: &[&str]) -> Result<Vec<(String, String, Option<String>)>> {
        let journal = self.journal()?.unwrap_or_default();
        let mut found: Vec<(String, String, Option<String>)> = journal
            .entries
            .iter()
            .map(|e| (e.path.clone(), e.backup.clone(), Some(e.checksum.clone())))
            .collect();

        for path in paths {
            if found.iter().any(|(known, _, _)| known == path) {
                continue;
            }
            let backup = self.sidecar(path);
            if self.absolute(&backup).is_file() {
                found.push((path.to_string(), backup, None));
            }
        }
        Ok(found)
    }

    /// Copy every backup over its live file, then remove the backups and the
    /// journal. Checksums are verified before anything is written.
    pub fn restore(&self, paths: &[&str]) -> Result<Vec<String>> {
        let mut verified = Vec::new();
        for (path, backup, checksum) in self.collect(paths)? {
            let sidecar = self.absolute(&backup);
            if !sidecar.is_file() {
                tracing::warn!(backup = %sidecar, "journaled backup is missing, skipping");
                continue;
            }
            let content = io::read_bytes(&sidecar)?;
            if let Some(expected) = checksum {
                let actual = compute_checksum(&content);
                if actual != expected {
                    return Err(Error::BackupCorrupted {
                        path: sidecar.to_native(),
                        expected,
                        actual,
                    });
                }
            }
            verified.push((path, sidecar, content));
        }

        if verified.is_empty() {
            tracing::info!("no backups to restore");
            io::remove_if_exists(&self.journal_path)?;
            return Ok(Vec::new());
        }

        let mut restored = Vec::with_capacity(verified.len());
        for (path, _, content) in &verified {
            io::write_atomic(&self.absolute(path), content)?;
            tracing::debug!(path = %path, "restored from backup");
        }
        for (path, sidecar, _) in verified {
            io::remove_if_exists(&sidecar)?;
            restored.push(path);
        }
        io::remove_if_exists(&self.journal_path)?;

        tracing::info!(count = restored.len(), "restored backups");
        Ok(restored)
    }

    /// Remove every backup and the journal without restoring.
    pub fn cleanup(&self, paths: &[&str]) -> Result<usize> {
        let mut removed = 0;
        for (_, backup, _) in self.collect(paths)? {
            if io::remove_if_exists(&self.absolute(&backup))? {
                removed += 1;
            }
        }
        io::remove_if_exists(&self.journal_path)?;

        if removed == 0 {
            tracing::info!("no backups to clean up");
        } else {
            tracing::info!(count = removed, "removed backups");
        }
        Ok(removed)
    }

    pub fn status(&self, paths: &[&str]) -> Result<BackupReport> {
        let journal = self.journal()?;
        let files = paths
            .iter()
            .map(|path| {
                let backup = self.sidecar(path);
                if self.absolute(&backup).is_file() {
                    BackupStatus {
                        path: path.to_string(),
                        state: BackupState::BackedUp,
                        backup: Some(backup),
                    }
                } else {
                    BackupStatus {
                        path: path.to_string(),
                        state: BackupState::Clean,
                        backup: None,
                    }
                }
            })
            .collect();
        Ok(BackupReport {
            journal: journal.map(|j| j.state),
            files,
        })
    }
}
