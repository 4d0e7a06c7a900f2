//! Format identity and adapter trait

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{VersionFields, VersionRecord};

/// File formats that can carry a version record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Yaml,
    Json,
    Dart,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Dart => "Dart",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads and rewrites the version-bearing fields of one file format.
///
/// Implementations work on whole file contents and never touch the
/// filesystem. `write` must change nothing outside the version-bearing
/// fields and must be idempotent: writing the same record into its own
/// output returns that output unchanged.
pub trait VersionFormat: Send + Sync {
    fn format(&self) -> Format;

    /// Human-readable description of what the file must contain.
    fn expected_shape(&self) -> String;

    /// Extract the fields this format carries.
    fn read(&self, source: &str) -> Result<VersionFields>;

    /// Return `source` with the version-bearing fields replaced by `record`.
    fn write(&self, source: &str, record: &VersionRecord) -> Result<String>;
}
