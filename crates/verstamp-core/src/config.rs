//! Project configuration (`.verstamp/config.toml`)
//!
//! Every section is optional. A missing file means the default layout:
//!
//! ```toml
//! [manifest]
//! path = "pubspec.yaml"
//!
//! [data_file]
//! path = "assets/version.json"
//!
//! [constants]
//! path = "lib/shared/lib/version.dart"
//! components = ["mainApp", "tunnelManager", "sharedLibrary"]
//!
//! [[secondary]]
//! path = "lib/shared/pubspec.yaml"
//!
//! [backup]
//! suffix = ".verstamp.bak"
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use verstamp_content::{ConstantsHandler, DataFileHandler, ManifestHandler};
use verstamp_fs::{NormalizedPath, io};

use crate::store::{Representation, RepresentationKind};
use crate::{Error, Result};

/// Directory holding configuration, the journal and the lock
pub const STATE_DIR: &str = ".verstamp";
pub const CONFIG_FILE: &str = "config.toml";
pub const JOURNAL_FILE: &str = "journal.toml";
pub const LOCK_FILE: &str = "lock";

pub const DEFAULT_MANIFEST: &str = "pubspec.yaml";
pub const DEFAULT_DATA_FILE: &str = "assets/version.json";
pub const DEFAULT_CONSTANTS: &str = "lib/shared/lib/version.dart";
pub const DEFAULT_SECONDARY: &str = "lib/shared/pubspec.yaml";
pub const DEFAULT_COMPONENTS: [&str; 3] = ["mainApp", "tunnelManager", "sharedLibrary"];
pub const DEFAULT_BACKUP_SUFFIX: &str = ".verstamp.bak";

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub path: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MANIFEST.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFileConfig {
    pub path: String,
    pub enabled: bool,
}

impl Default for DataFileConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATA_FILE.to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantsConfig {
    pub path: String,
    pub components: Vec<String>,
    pub enabled: bool,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CONSTANTS.to_string(),
            components: DEFAULT_COMPONENTS.iter().map(|c| c.to_string()).collect(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryConfig {
    pub path: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub suffix: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

/// Where each representation lives and how backups are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manifest: ManifestConfig,
    pub data_file: DataFileConfig,
    pub constants: ConstantsConfig,
    pub secondary: Vec<SecondaryConfig>,
    pub backup: BackupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: ManifestConfig::default(),
            data_file: DataFileConfig::default(),
            constants: ConstantsConfig::default(),
            secondary: vec![SecondaryConfig {
                path: DEFAULT_SECONDARY.to_string(),
                enabled: true,
            }],
            backup: BackupConfig::default(),
        }
    }
}

impl Config {
    /// Path of the configuration file under `root`.
    pub fn path(root: &NormalizedPath) -> NormalizedPath {
        root.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Load `.verstamp/config.toml` under `root`, or the defaults if absent.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = Self::path(root);
        if !path.is_file() {
            tracing::debug!(path = %path, "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = io::read_text(&path)?;
        let config = Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_native(),
            message,
        })?;
        tracing::debug!(path = %path, "loaded configuration");
        Ok(config)
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.backup.suffix.is_empty() {
            return Err("backup suffix must not be empty".to_string());
        }
        Ok(config)
    }

    /// The enabled representations, manifest first.
    ///
    /// Fails if a component alias is not a valid identifier.
    pub fn representations(&self) -> Result<Vec<Representation>> {
        let mut representations = vec![Representation::new(
            RepresentationKind::Manifest,
            &self.manifest.path,
            Arc::new(ManifestHandler::new()),
        )];

        if self.data_file.enabled {
            representations.push(Representation::new(
                RepresentationKind::DataFile,
                &self.data_file.path,
                Arc::new(DataFileHandler::new()),
            ));
        }

        if self.constants.enabled {
            let handler = ConstantsHandler::new(&self.constants.components)?;
            representations.push(Representation::new(
                RepresentationKind::Constants,
                &self.constants.path,
                Arc::new(handler),
            ));
        }

        for secondary in self.secondary.iter().filter(|s| s.enabled) {
            representations.push(Representation::new(
                RepresentationKind::Secondary,
                &secondary.path,
                Arc::new(ManifestHandler::new()),
            ));
        }

        Ok(representations)
    }
}
