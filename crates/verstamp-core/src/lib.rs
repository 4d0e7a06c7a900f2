//! Core synchronization layer for verstamp
//!
//! This crate keeps one logical version record consistent across every
//! representation a product carries. It provides:
//!
//! - [`config`]: which representations exist and where they live
//! - [`store`]: reading and rewriting representations (file-backed and in-memory)
//! - [`generator`]: build identifiers, immediate or deferred
//! - [`sync`]: the engine behind every command, plus consistency checks
//! - [`backup`]: sidecar backups, the journal and crash detection
//! - [`classify`]: release advisories from a version change

pub mod backup;
pub mod classify;
pub mod config;
pub mod error;
pub mod generator;
pub mod revision;
pub mod store;
pub mod sync;

pub use backup::{BackupManager, BackupReport, BackupState, BackupStatus, Journal, JournalState};
pub use classify::{Classification, Direction, classify};
pub use config::Config;
pub use error::{Error, Result};
pub use generator::{BuildIdGenerator, Clock, FixedClock, SystemClock};
pub use revision::{FixedRevision, GitRevision, RevisionSource};
pub use store::{
    FileStore, Inspection, MemoryStore, Representation, RepresentationKind, RepresentationState,
    VersionStore, WriteAction, WriteOutcome,
};
pub use sync::{CheckReport, CheckStatus, DriftItem, Operation, SyncEngine, SyncOptions, SyncReport};

// Re-exported so callers need only one dependency for the record types
pub use verstamp_content::{BuildId, ChangeKind, SemanticVersion, VersionFields, VersionRecord};
