//! In-memory version store for tests

use std::collections::BTreeMap;

use verstamp_content::VersionRecord;
use verstamp_fs::InvocationLock;

use super::{Inspection, Representation, VersionStore, WriteOutcome, inspect_all, plan, read_record};
use crate::backup::{BackupReport, BackupState, BackupStatus, JournalState};
use crate::config::{Config, DEFAULT_BACKUP_SUFFIX};
use crate::sync::SyncOptions;
use crate::{Error, Result};

/// Version store holding representation contents in memory.
///
/// Backups follow the same rules as on disk: taken before the first change
/// of a representation and kept until `restore` or `cleanup`.
#[derive(Debug)]
pub struct MemoryStore {
    representations: Vec<Representation>,
    files: BTreeMap<String, String>,
    backups: BTreeMap<String, String>,
    interrupted: bool,
}

impl MemoryStore {
    pub fn new(representations: Vec<Representation>) -> Self {
        Self {
            representations,
            files: BTreeMap::new(),
            backups: BTreeMap::new(),
            interrupted: false,
        }
    }

    /// Store with the default representation layout.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Config::default().representations()?))
    }

    /// Set the contents of the file at `path`.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.files.remove(path)
    }

    /// Simulate a pass that stopped after taking backups.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    fn contents(&self, representation: &Representation) -> Result<Option<String>> {
        Ok(self.files.get(representation.path()).cloned())
    }
}

impl VersionStore for MemoryStore {
    fn representations(&self) -> &[Representation] {
        &self.representations
    }

    fn record(&self) -> Result<VersionRecord> {
        read_record(&self.representations, |r| self.contents(r))
    }

    fn inspect(&self) -> Result<Vec<Inspection>> {
        Ok(inspect_all(&self.representations, |r| self.contents(r)))
    }

    fn write_all(
        &mut self,
        record: &VersionRecord,
        options: &SyncOptions,
    ) -> Result<Vec<WriteOutcome>> {
        let planned = plan(&self.representations, record, |r| self.contents(r))?;
        let outcomes = planned.iter().map(|p| p.outcome(options.dry_run)).collect();
        if options.dry_run || !planned.iter().any(|p| p.changed()) {
            return Ok(outcomes);
        }

        let mut updates = Vec::new();
        for planned in &planned {
            let path = planned.representation.path().to_string();
            if let Some(current) = &planned.current {
                self.backups
                    .entry(path.clone())
                    .or_insert_with(|| current.clone());
            }
            if planned.changed() {
                if let Some(rendered) = &planned.rendered {
                    updates.push((path, rendered.clone()));
                }
            }
        }
        self.files.extend(updates);
        Ok(outcomes)
    }

    fn restore(&mut self) -> Result<Vec<String>> {
        let backups = std::mem::take(&mut self.backups);
        let restored = backups.keys().cloned().collect();
        self.files.extend(backups);
        self.interrupted = false;
        Ok(restored)
    }

    fn cleanup(&mut self) -> Result<usize> {
        let removed = self.backups.len();
        self.backups.clear();
        self.interrupted = false;
        Ok(removed)
    }

    fn backups(&self) -> Result<BackupReport> {
        let files = self
            .representations
            .iter()
            .map(|r| {
                let backed_up = self.backups.contains_key(r.path());
                BackupStatus {
                    path: r.path().to_string(),
                    state: if backed_up {
                        BackupState::BackedUp
                    } else {
                        BackupState::Clean
                    },
                    backup: backed_up.then(|| format!("{}{DEFAULT_BACKUP_SUFFIX}", r.path())),
                }
            })
            .collect();
        let journal = if self.interrupted {
            Some(JournalState::Writing)
        } else if self.backups.is_empty() {
            None
        } else {
            Some(JournalState::Settled)
        };
        Ok(BackupReport { journal, files })
    }

    fn ensure_settled(&self) -> Result<()> {
        if self.interrupted {
            return Err(Error::InterruptedRun {
                journal: "memory".into(),
            });
        }
        Ok(())
    }

    fn lock(&self) -> Result<Option<InvocationLock>> {
        Ok(None)
    }
}
