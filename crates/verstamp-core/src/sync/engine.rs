//! SyncEngine: the pipeline behind every command

use std::path::Path;

use verstamp_content::{ChangeKind, SemanticVersion, VersionRecord};

use super::check::{CheckReport, DriftItem};
use super::report::{Operation, SyncOptions, SyncReport};
use crate::backup::BackupReport;
use crate::classify::{Direction, classify};
use crate::generator::{BuildIdGenerator, Clock, SystemClock};
use crate::revision::{GitRevision, RevisionSource};
use crate::store::{FileStore, RepresentationState, VersionStore};
use crate::Result;

/// Keeps every representation of one project in step with its manifest.
///
/// Mutating operations take the store's lock, refuse to run after an
/// interrupted pass, and either update every present representation or
/// none of them.
pub struct SyncEngine {
    store: Box<dyn VersionStore>,
    clock: Box<dyn Clock>,
    revisions: Box<dyn RevisionSource>,
}

impl SyncEngine {
    pub fn new(
        store: Box<dyn VersionStore>,
        clock: Box<dyn Clock>,
        revisions: Box<dyn RevisionSource>,
    ) -> Self {
        Self {
            store,
            clock,
            revisions,
        }
    }

    /// Engine over the checkout at `root` with the system clock and git.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let store = FileStore::open(root)?;
        let revisions = GitRevision::new(store.root().to_native());
        Ok(Self::new(
            Box::new(store),
            Box::new(SystemClock),
            Box::new(revisions),
        ))
    }

    pub fn store(&self) -> &dyn VersionStore {
        self.store.as_ref()
    }

    /// The current record, as held by the manifest.
    pub fn record(&self) -> Result<VersionRecord> {
        self.store.record()
    }

    /// Fails if the manifest's version is malformed or missing.
    pub fn validate(&self) -> Result<VersionRecord> {
        let record = self.store.record()?;
        tracing::info!(version = %record, "version is valid");
        Ok(record)
    }

    /// Bump `kind` and stamp a new build identifier now.
    pub fn increment(&mut self, kind: ChangeKind, options: SyncOptions) -> Result<SyncReport> {
        self.apply(
            Operation::Increment(kind),
            |semantic| Ok(semantic.bump(kind)?),
            BuildIdGenerator::Immediate,
            options,
        )
    }

    /// Bump `kind` and leave the build identifier for `inject`.
    pub fn prepare(&mut self, kind: ChangeKind, options: SyncOptions) -> Result<SyncReport> {
        self.apply(
            Operation::Prepare(kind),
            |semantic| Ok(semantic.bump(kind)?),
            BuildIdGenerator::Deferred,
            options,
        )
    }

    /// Force the semantic version and stamp a new build identifier now.
    ///
    /// `version` is validated before anything else happens.
    pub fn set(&mut self, version: &str, options: SyncOptions) -> Result<SyncReport> {
        let target = SemanticVersion::parse(version)?;
        self.apply(
            Operation::Set,
            move |_| Ok(target),
            BuildIdGenerator::Immediate,
            options,
        )
    }

    /// Replace the build identifier (usually the sentinel) with one for now.
    pub fn inject(&mut self, options: SyncOptions) -> Result<SyncReport> {
        self.apply(
            Operation::Inject,
            Ok,
            BuildIdGenerator::Immediate,
            options,
        )
    }

    /// Revert every representation from its backup.
    pub fn restore(&mut self) -> Result<Vec<String>> {
        let _lock = self.store.lock()?;
        self.store.restore()
    }

    /// Discard every backup.
    pub fn cleanup(&mut self) -> Result<usize> {
        let _lock = self.store.lock()?;
        self.store.cleanup()
    }

    pub fn backups(&self) -> Result<BackupReport> {
        self.store.backups()
    }

    /// Compare every representation against the manifest.
    pub fn check(&self) -> Result<CheckReport> {
        let record = match self.store.record() {
            Ok(record) => record,
            Err(e) => return Ok(CheckReport::broken(e.to_string())),
        };
        let mut report = CheckReport::healthy(record.clone());

        if let Err(e) = self.store.ensure_settled() {
            report.break_with(e.to_string());
        }

        for inspection in self.store.inspect()?.into_iter().skip(1) {
            match inspection.state {
                RepresentationState::Absent => {
                    report
                        .messages
                        .push(format!("{} not present, skipped", inspection.path));
                }
                RepresentationState::Unreadable { message } => {
                    report.break_with(message);
                }
                RepresentationState::Present { fields } => {
                    for description in fields.mismatches(&record) {
                        report.drift(DriftItem {
                            kind: inspection.kind,
                            path: inspection.path.clone(),
                            description,
                        });
                    }
                }
            }
        }

        tracing::info!(status = ?report.status, drifted = report.drifted.len(), "check complete");
        Ok(report)
    }

    fn apply<F>(
        &mut self,
        operation: Operation,
        next_semantic: F,
        generator: BuildIdGenerator,
        options: SyncOptions,
    ) -> Result<SyncReport>
    where
        F: FnOnce(SemanticVersion) -> Result<SemanticVersion>,
    {
        let _lock = if options.dry_run {
            None
        } else {
            let lock = self.store.lock()?;
            self.store.ensure_settled()?;
            lock
        };

        // Validate
        let previous = self.store.record()?;
        let semantic = next_semantic(previous.semantic)?;

        // Derive
        let build = generator.generate(self.clock.as_ref());
        let record = VersionRecord::new(semantic, build).derive(self.revisions.revision());

        let classification = classify(&previous.semantic, &record.semantic);
        if classification.direction == Direction::Downgrade {
            tracing::warn!(from = %previous.semantic, to = %record.semantic, "version moves backwards");
        }

        // Propagate
        let outcomes = self.store.write_all(&record, &options)?;

        let report = SyncReport {
            operation,
            previous,
            record,
            classification,
            outcomes,
            dry_run: options.dry_run,
        };
        tracing::info!(
            operation = %report.operation,
            version = %report.record,
            written = report.written().len(),
            dry_run = report.dry_run,
            "sync complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FixedClock;
    use crate::revision::FixedRevision;
    use crate::store::{MemoryStore, WriteAction};
    use crate::sync::CheckStatus;
    use crate::Error;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use verstamp_content::SENTINEL;
    use verstamp_test_utils::project::{self, CONSTANTS, DATA_FILE, MANIFEST, SECONDARY};

    fn store(version: &str, build: &str) -> MemoryStore {
        let mut store = MemoryStore::with_defaults().unwrap();
        let date = "2025-01-01T00:00:00Z";
        store
            .insert(MANIFEST, project::manifest_yaml(version, build))
            .insert(SECONDARY, project::secondary_yaml(version, build))
            .insert(DATA_FILE, project::data_json(version, build, date, "unknown"))
            .insert(CONSTANTS, project::constants_dart(version, build, date));
        store
    }

    fn engine(store: MemoryStore) -> SyncEngine {
        SyncEngine::new(
            Box::new(store),
            Box::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 9, 22, 4, 31).unwrap())),
            Box::new(FixedRevision::new("abc1234")),
        )
    }

    #[test]
    fn increment_minor_resets_patch() {
        let mut engine = engine(store("2.9.9", "202501010000"));
        let report = engine.increment(ChangeKind::Minor, SyncOptions::new()).unwrap();

        assert_eq!(report.record.full(), "2.10.0+202506092204");
        assert_eq!(report.previous.full(), "2.9.9+202501010000");
        assert_eq!(report.written().len(), 4);
        assert!(!report.release_advised());
        assert_eq!(engine.record().unwrap().full(), "2.10.0+202506092204");
        assert!(engine.check().unwrap().is_consistent());
    }

    #[test]
    fn prepare_major_defers_the_build() {
        let mut engine = engine(store("3.5.5", "202501010000"));
        let report = engine.prepare(ChangeKind::Major, SyncOptions::new()).unwrap();

        assert_eq!(report.record.full(), format!("4.0.0+{SENTINEL}"));
        assert!(report.release_advised());
        assert_eq!(engine.check().unwrap().status, CheckStatus::Pending);

        let report = engine.inject(SyncOptions::new()).unwrap();
        assert_eq!(report.record.full(), "4.0.0+202506092204");
        assert_eq!(report.record.timestamp.as_deref(), Some("2025-06-09T22:04:00Z"));
        assert_eq!(report.record.revision.as_deref(), Some("abc1234"));
    }

    #[test]
    fn increment_build_keeps_semantic() {
        let mut engine = engine(store("1.2.3", "202501010000"));
        let report = engine.increment(ChangeKind::Build, SyncOptions::new()).unwrap();
        assert_eq!(report.record.full(), "1.2.3+202506092204");
        assert_eq!(report.classification.kind, ChangeKind::Build);
    }

    #[test]
    fn set_rejects_malformed_input_before_touching_anything() {
        let mut engine = engine(store("1.2.3", "202501010000"));
        let before = engine.store().inspect().unwrap();

        for bad in ["1.2", "v1.2.3", "1.2.3-beta", "01.2.3", ""] {
            let err = engine.set(bad, SyncOptions::new()).unwrap_err();
            assert!(matches!(
                err,
                Error::Content(verstamp_content::Error::MalformedVersion { .. })
            ));
        }
        assert_eq!(engine.store().inspect().unwrap(), before);
        assert!(!engine.backups().unwrap().has_backups());
    }

    #[test]
    fn set_downgrade_is_allowed() {
        let mut engine = engine(store("2.0.0", "202501010000"));
        let report = engine.set("1.9.0", SyncOptions::new()).unwrap();
        assert_eq!(report.classification.direction, Direction::Downgrade);
        assert_eq!(engine.record().unwrap().semantic.to_string(), "1.9.0");
    }

    #[test]
    fn dry_run_changes_nothing() {
        let mut engine = engine(store("1.2.3", "202501010000"));
        let before = engine.store().inspect().unwrap();

        let report = engine.increment(ChangeKind::Patch, SyncOptions::dry_run()).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.record.semantic.to_string(), "1.2.4");
        assert!(report.outcomes.iter().all(|o| o.diff.is_some()));
        assert_eq!(engine.store().inspect().unwrap(), before);
        assert!(!engine.backups().unwrap().has_backups());
    }

    #[test]
    fn restore_after_prepare_and_inject_returns_to_the_start() {
        let mut engine = engine(store("3.5.5", "202501010000"));
        let before = engine.store().inspect().unwrap();

        engine.prepare(ChangeKind::Patch, SyncOptions::new()).unwrap();
        engine.inject(SyncOptions::new()).unwrap();
        let restored = engine.restore().unwrap();

        assert_eq!(restored.len(), 4);
        assert_eq!(engine.record().unwrap().full(), "3.5.5+202501010000");
        assert_eq!(engine.store().inspect().unwrap(), before);
        assert!(engine.restore().unwrap().is_empty());
    }

    #[test]
    fn cleanup_keeps_changes() {
        let mut engine = engine(store("1.0.0", "202501010000"));
        engine.increment(ChangeKind::Major, SyncOptions::new()).unwrap();

        assert_eq!(engine.cleanup().unwrap(), 4);
        assert_eq!(engine.cleanup().unwrap(), 0);
        assert!(engine.restore().unwrap().is_empty());
        assert_eq!(engine.record().unwrap().semantic.to_string(), "2.0.0");
    }

    #[test]
    fn interrupted_run_blocks_mutation_until_restore() {
        let mut store = store("1.0.0", "202501010000");
        store.mark_interrupted();
        let mut engine = engine(store);

        assert!(matches!(
            engine.inject(SyncOptions::new()),
            Err(Error::InterruptedRun { .. })
        ));
        assert_eq!(engine.check().unwrap().status, CheckStatus::Broken);

        engine.restore().unwrap();
        engine.inject(SyncOptions::new()).unwrap();
    }

    #[test]
    fn missing_optional_representation_is_skipped() {
        let mut store = store("1.0.0", "202501010000");
        store.remove(DATA_FILE);
        let mut engine = engine(store);

        let report = engine.increment(ChangeKind::Patch, SyncOptions::new()).unwrap();
        assert_eq!(report.skipped(), vec![DATA_FILE]);
        let outcome = report.outcomes.iter().find(|o| o.path == DATA_FILE).unwrap();
        assert_eq!(outcome.action, WriteAction::Skipped);
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let mut store = store("1.0.0", "202501010000");
        store.remove(MANIFEST);
        let mut engine = engine(store);

        assert!(matches!(
            engine.inject(SyncOptions::new()),
            Err(Error::ManifestNotFound { .. })
        ));
        assert_eq!(engine.check().unwrap().status, CheckStatus::Broken);
    }

    #[test]
    fn unparsable_representation_aborts_the_whole_pass() {
        let mut store = store("1.0.0", "202501010000");
        store.insert(CONSTANTS, "class SharedVersion {}\n");
        let mut engine = engine(store);
        let before = engine.store().inspect().unwrap();

        let err = engine.increment(ChangeKind::Patch, SyncOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Representation { ref path, .. } if path == CONSTANTS));
        assert_eq!(engine.store().inspect().unwrap(), before);
    }

    #[test]
    fn check_reports_hand_edited_drift() {
        let mut store = store("1.0.0", "202501010000");
        store.insert(SECONDARY, project::secondary_yaml("0.9.0", "202501010000"));
        let engine = engine(store);

        let report = engine.check().unwrap();
        assert_eq!(report.status, CheckStatus::Drifted);
        assert_eq!(report.drifted.len(), 1);
        assert_eq!(report.drifted[0].path, SECONDARY);
    }
}
