//! Error types for verstamp-core

use std::path::PathBuf;

/// Result type for verstamp-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in verstamp-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The required manifest is missing
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// A representation exists but its contents cannot be read or rewritten
    #[error("{path}: {source}")]
    Representation {
        path: String,
        #[source]
        source: verstamp_content::Error,
    },

    /// A previous mutating run stopped between backup and completion
    #[error(
        "A previous run was interrupted (journal at {journal} is still open); run `verstamp restore` or `verstamp cleanup` first"
    )]
    InterruptedRun { journal: PathBuf },

    /// Another invocation holds the advisory lock
    #[error("Another verstamp invocation is running (lock held at {path})")]
    LockHeld { path: PathBuf },

    /// A backup no longer matches the checksum recorded when it was taken
    #[error("Backup {path} is corrupted: expected {expected}, found {actual}")]
    BackupCorrupted {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Configuration file could not be understood
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Journal file could not be understood
    #[error("Invalid backup journal at {path}: {message}")]
    Journal { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from verstamp-fs
    #[error(transparent)]
    Fs(#[from] verstamp_fs::Error),

    /// Content error from verstamp-content
    #[error(transparent)]
    Content(#[from] verstamp_content::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Attach the representation path to an adapter error.
    pub fn representation(path: impl Into<String>, source: verstamp_content::Error) -> Self {
        Self::Representation {
            path: path.into(),
            source,
        }
    }
}
