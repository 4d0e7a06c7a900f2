//! The backup journal (`.verstamp/journal.toml`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verstamp_fs::{NormalizedPath, io};

use crate::{Error, Result};

/// Whether a mutating pass finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalState {
    /// Backups are taken and live files may be half-updated
    Writing,
    /// The last pass completed; backups remain until restore or cleanup
    Settled,
}

/// One backed-up representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Representation path, relative to the project root
    pub path: String,
    /// Sidecar path, relative to the project root
    pub backup: String,
    /// `sha256:<hex>` of the backed-up contents
    pub checksum: String,
}

/// Ordered record of the backups taken since the last restore or cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub state: JournalState,
    pub created: DateTime<Utc>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<JournalEntry>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal {
    pub fn new() -> Self {
        Self {
            state: JournalState::Settled,
            created: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Load the journal at `path`, if there is one.
    pub fn load(path: &NormalizedPath) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = io::read_text(path)?;
        let journal = toml::from_str(&content).map_err(|e| Error::Journal {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        Ok(Some(journal))
    }

    /// Save atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        io::write_text(path, &content)?;
        tracing::debug!(path = %path, state = ?self.state, entries = self.entries.len(), "saved journal");
        Ok(())
    }

    pub fn entry(&self, path: &str) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    pub fn push(&mut self, entry: JournalEntry) {
        if self.entry(&entry.path).is_none() {
            self.entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(path: &str) -> JournalEntry {
        JournalEntry {
            path: path.to_string(),
            backup: format!("{path}.verstamp.bak"),
            checksum: "sha256:00".to_string(),
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path()).join(".verstamp/journal.toml");

        let mut journal = Journal::new();
        journal.state = JournalState::Writing;
        journal.push(entry("pubspec.yaml"));
        journal.push(entry("assets/version.json"));
        journal.save(&path).unwrap();

        let content = std::fs::read_to_string(path.to_native()).unwrap();
        assert!(content.contains("state = \"writing\""));
        assert!(content.contains("[[entry]]"));

        let loaded = Journal::load(&path).unwrap().unwrap();
        assert_eq!(loaded, journal);
    }

    #[test]
    fn push_keeps_the_first_backup_of_a_path() {
        let mut journal = Journal::new();
        journal.push(entry("pubspec.yaml"));
        journal.push(JournalEntry {
            checksum: "sha256:ff".to_string(),
            ..entry("pubspec.yaml")
        });
        assert_eq!(journal.entries.len(), 1);
        assert_eq!(journal.entries[0].checksum, "sha256:00");
    }

    #[test]
    fn missing_journal_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path()).join("journal.toml");
        assert!(Journal::load(&path).unwrap().is_none());
    }

    #[test]
    fn garbage_journal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path()).join("journal.toml");
        std::fs::write(path.to_native(), "state = 12").unwrap();
        assert!(matches!(Journal::load(&path), Err(Error::Journal { .. })));
    }
}
