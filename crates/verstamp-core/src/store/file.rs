//! Filesystem-backed version store

use std::path::Path;

use verstamp_content::VersionRecord;
use verstamp_fs::{InvocationLock, NormalizedPath, io};

use super::{Inspection, Representation, VersionStore, WriteOutcome, inspect_all, plan, read_record};
use crate::backup::{BackupManager, BackupReport};
use crate::config::{Config, LOCK_FILE, STATE_DIR};
use crate::sync::SyncOptions;
use crate::{Error, Result};

/// Version store over the representation files of one checkout.
#[derive(Debug)]
pub struct FileStore {
    root: NormalizedPath,
    representations: Vec<Representation>,
    backups: BackupManager,
}

impl FileStore {
    /// Open the project at `root`, reading `.verstamp/config.toml` if present.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = NormalizedPath::canonicalize(root)?;
        let config = Config::load(&root)?;
        Self::with_config(root, &config)
    }

    pub fn with_config(root: NormalizedPath, config: &Config) -> Result<Self> {
        let representations = config.representations()?;
        let backups = BackupManager::new(root.clone(), config.backup.suffix.clone());
        Ok(Self {
            root,
            representations,
            backups,
        })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn absolute(&self, representation: &Representation) -> NormalizedPath {
        self.root.join(representation.path())
    }

    fn contents(&self, representation: &Representation) -> Result<Option<String>> {
        let path = self.absolute(representation);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(io::read_text(&path)?))
    }

    fn paths(&self) -> Vec<&str> {
        self.representations.iter().map(|r| r.path()).collect()
    }
}

impl VersionStore for FileStore {
    fn representations(&self) -> &[Representation] {
        &self.representations
    }

    fn record(&self) -> Result<VersionRecord> {
        read_record(&self.representations, |r| self.contents(r)).map_err(|e| match e {
            Error::ManifestNotFound { path } => Error::ManifestNotFound {
                path: self.root.to_native().join(path),
            },
            other => other,
        })
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
        let outcomes: Vec<_> = planned.iter().map(|p| p.outcome(options.dry_run)).collect();

        let changed: Vec<_> = planned.iter().filter(|p| p.changed()).collect();
        if options.dry_run || changed.is_empty() {
            return Ok(outcomes);
        }

        let present: Vec<&str> = planned
            .iter()
            .filter(|p| p.current.is_some())
            .map(|p| p.representation.path())
            .collect();
        let journal = self.backups.begin(&present)?;

        for planned in changed {
            if let Some(rendered) = &planned.rendered {
                io::write_text(&self.absolute(planned.representation), rendered)?;
                tracing::debug!(path = planned.representation.path(), "updated representation");
            }
        }

        self.backups.settle(journal)?;
        Ok(outcomes)
    }

    fn restore(&mut self) -> Result<Vec<String>> {
        self.backups.restore(&self.paths())
    }

    fn cleanup(&mut self) -> Result<usize> {
        self.backups.cleanup(&self.paths())
    }

    fn backups(&self) -> Result<BackupReport> {
        self.backups.status(&self.paths())
    }

    fn ensure_settled(&self) -> Result<()> {
        self.backups.ensure_settled()
    }

    fn lock(&self) -> Result<Option<InvocationLock>> {
        let path = self.root.join(STATE_DIR).join(LOCK_FILE);
        match InvocationLock::acquire(&path) {
            Ok(lock) => Ok(Some(lock)),
            Err(verstamp_fs::Error::LockHeld { path }) => Err(Error::LockHeld { path }),
            Err(e) => Err(e.into()),
        }
    }
}
