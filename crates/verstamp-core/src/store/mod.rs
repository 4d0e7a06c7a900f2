//! Version store: reading and rewriting every representation
//!
//! The manifest is the source of truth; every other representation is
//! derived from it. [`FileStore`] works on a checkout, [`MemoryStore`] holds
//! contents in memory so the engine can be exercised without a filesystem.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use similar::TextDiff;
use verstamp_content::{BuildId, SemanticVersion, VersionFields, VersionFormat, VersionRecord};
use verstamp_fs::InvocationLock;

use crate::backup::BackupReport;
use crate::sync::SyncOptions;
use crate::{Error, Result};

/// The role a representation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    Manifest,
    DataFile,
    Constants,
    Secondary,
}

impl RepresentationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::DataFile => "data file",
            Self::Constants => "constants",
            Self::Secondary => "secondary manifest",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file that carries (part of) the version record.
#[derive(Clone)]
pub struct Representation {
    kind: RepresentationKind,
    path: String,
    handler: Arc<dyn VersionFormat>,
}

impl Representation {
    /// `path` is relative to the project root, with forward slashes.
    pub fn new(kind: RepresentationKind, path: &str, handler: Arc<dyn VersionFormat>) -> Self {
        Self {
            kind,
            path: path.replace('\\', "/").trim_start_matches("./").to_string(),
            handler,
        }
    }

    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &dyn VersionFormat {
        self.handler.as_ref()
    }

    /// Read this representation's fields, attaching the path to errors.
    pub fn read(&self, source: &str) -> Result<VersionFields> {
        self.handler
            .read(source)
            .map_err(|e| Error::representation(&self.path, e))
    }

    /// Render `record` into `source`, attaching the path to errors.
    pub fn render(&self, source: &str, record: &VersionRecord) -> Result<String> {
        self.handler
            .write(source, record)
            .map_err(|e| Error::representation(&self.path, e))
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("format", &self.handler.format())
            .finish()
    }
}

/// What one representation currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RepresentationState {
    Present { fields: VersionFields },
    Absent,
    Unreadable { message: String },
}

/// Result of inspecting one representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub kind: RepresentationKind,
    pub path: String,
    #[serde(flatten)]
    pub state: RepresentationState,
}

/// What happened to one representation during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Written,
    Unchanged,
    /// The representation does not exist and was not created
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub kind: RepresentationKind,
    pub path: String,
    pub action: WriteAction,
    /// Unified diff of the change, computed for dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Access to every representation of one project.
///
/// Mutating methods assume the caller holds the lock returned by
/// [`VersionStore::lock`].
pub trait VersionStore: Send {
    /// The configured representations, manifest first.
    fn representations(&self) -> &[Representation];

    /// The record as held by the manifest.
    fn record(&self) -> Result<VersionRecord>;

    fn semantic(&self) -> Result<SemanticVersion> {
        Ok(self.record()?.semantic)
    }

    fn build(&self) -> Result<BuildId> {
        Ok(self.record()?.build)
    }

    /// What each representation currently holds. Parse failures are
    /// reported per representation instead of failing the call.
    fn inspect(&self) -> Result<Vec<Inspection>>;

    /// Render `record` into every present representation.
    ///
    /// Every representation is rendered before anything is written, so an
    /// adapter failure leaves all files untouched. Representations are
    /// backed up before their first change.
    fn write_all(&mut self, record: &VersionRecord, options: &SyncOptions)
    -> Result<Vec<WriteOutcome>>;

    /// Put every backed-up representation back and drop the backups.
    /// Returns the restored paths.
    fn restore(&mut self) -> Result<Vec<String>>;

    /// Drop every backup without restoring. Returns how many were removed.
    fn cleanup(&mut self) -> Result<usize>;

    /// Backup state per representation.
    fn backups(&self) -> Result<BackupReport>;

    /// Fail with [`Error::InterruptedRun`] if an earlier pass never settled.
    fn ensure_settled(&self) -> Result<()>;

    /// Take the invocation lock, if this store has one.
    fn lock(&self) -> Result<Option<InvocationLock>>;
}

/// The record held by the manifest, given a way to fetch contents.
///
/// The revision is borrowed from the first other representation that
/// carries one; failures there are left for `check` to report.
pub(crate) fn read_record<F>(representations: &[Representation], contents: F) -> Result<VersionRecord>
where
    F: Fn(&Representation) -> Result<Option<String>>,
{
    let Some(manifest) = representations.first() else {
        return Err(Error::ManifestNotFound {
            path: Default::default(),
        });
    };
    let source = contents(manifest)?.ok_or_else(|| Error::ManifestNotFound {
        path: manifest.path().into(),
    })?;

    let fields = manifest.read(&source)?;
    let (Some(semantic), Some(build)) = (fields.semantic, fields.build) else {
        return Err(Error::representation(
            manifest.path(),
            verstamp_content::Error::parse(
                manifest.handler().format().name(),
                format!("expected {}", manifest.handler().expected_shape()),
            ),
        ));
    };

    let revision = representations[1..].iter().find_map(|representation| {
        let source = contents(representation).ok().flatten()?;
        representation.read(&source).ok()?.revision
    });

    Ok(VersionRecord::new(semantic, build).derive(revision))
}

/// Every representation's state. Read and parse failures become
/// [`RepresentationState::Unreadable`] so one bad file never hides the rest.
pub(crate) fn inspect_all<F>(representations: &[Representation], contents: F) -> Vec<Inspection>
where
    F: Fn(&Representation) -> Result<Option<String>>,
{
    representations
        .iter()
        .map(|representation| {
            let state = match contents(representation) {
                Ok(None) => RepresentationState::Absent,
                Ok(Some(source)) => match representation.read(&source) {
                    Ok(fields) => RepresentationState::Present { fields },
                    Err(e) => RepresentationState::Unreadable {
                        message: e.to_string(),
                    },
                },
                Err(e) => RepresentationState::Unreadable {
                    message: format!("{}: {e}", representation.path()),
                },
            };
            Inspection {
                kind: representation.kind(),
                path: representation.path().to_string(),
                state,
            }
        })
        .collect()
}

/// One representation's contents before and after a pass.
#[derive(Debug)]
pub(crate) struct Planned<'a> {
    pub representation: &'a Representation,
    pub current: Option<String>,
    pub rendered: Option<String>,
}

impl Planned<'_> {
    pub fn changed(&self) -> bool {
        match (&self.current, &self.rendered) {
            (Some(current), Some(rendered)) => current != rendered,
            _ => false,
        }
    }

    pub fn outcome(&self, dry_run: bool) -> WriteOutcome {
        let action = match (&self.current, self.changed()) {
            (None, _) => WriteAction::Skipped,
            (Some(_), true) => WriteAction::Written,
            (Some(_), false) => WriteAction::Unchanged,
        };
        let diff = match (&self.current, &self.rendered) {
            (Some(current), Some(rendered)) if dry_run && current != rendered => {
                Some(unified_diff(self.representation.path(), current, rendered))
            }
            _ => None,
        };
        WriteOutcome {
            kind: self.representation.kind(),
            path: self.representation.path().to_string(),
            action,
            diff,
        }
    }
}

/// Render `record` into every representation. Nothing is written here.
///
/// The manifest must be present; other absent representations are skipped
/// with a warning.
pub(crate) fn plan<'a, F>(
    representations: &'a [Representation],
    record: &VersionRecord,
    contents: F,
) -> Result<Vec<Planned<'a>>>
where
    F: Fn(&Representation) -> Result<Option<String>>,
{
    let mut planned = Vec::with_capacity(representations.len());
    for representation in representations {
        let current = contents(representation)?;
        let rendered = match &current {
            Some(source) => Some(representation.render(source, record)?),
            None if representation.kind() == RepresentationKind::Manifest => {
                return Err(Error::ManifestNotFound {
                    path: representation.path().into(),
                });
            }
            None => {
                tracing::warn!(
                    path = representation.path(),
                    kind = %representation.kind(),
                    "representation not found, skipping"
                );
                None
            }
        };
        planned.push(Planned {
            representation,
            current,
            rendered,
        });
    }
    Ok(planned)
}

fn unified_diff(path: &str, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(1)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}
