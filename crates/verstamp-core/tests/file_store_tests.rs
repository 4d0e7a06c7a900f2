//! End-to-end engine behavior against files on disk

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use verstamp_core::{
    BackupState, ChangeKind, CheckStatus, Error, FileStore, FixedClock, FixedRevision,
    JournalState, SyncEngine, SyncOptions, VersionStore,
};
use verstamp_fs::InvocationLock;
use verstamp_fs::NormalizedPath;
use verstamp_test_utils::project::{CONSTANTS, DATA_FILE, MANIFEST, SECONDARY, TestProject};

const SENTINEL: &str = "BUILD_TIME_PLACEHOLDER";

fn engine(project: &TestProject) -> SyncEngine {
    SyncEngine::new(
        Box::new(FileStore::open(project.root()).unwrap()),
        Box::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 9, 22, 4, 0).unwrap())),
        Box::new(FixedRevision::new("abc1234")),
    )
}

#[rstest]
#[case(ChangeKind::Major, "4.0.0")]
#[case(ChangeKind::Minor, "3.6.0")]
#[case(ChangeKind::Patch, "3.5.6")]
#[case(ChangeKind::Build, "3.5.5")]
fn increment_updates_every_representation(#[case] kind: ChangeKind, #[case] expected: &str) {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let mut engine = engine(&project);

    engine.increment(kind, SyncOptions::new()).unwrap();

    let full = format!("{expected}+202506092204");
    project.assert_file_contains(MANIFEST, &format!("version: {full}\n"));
    project.assert_file_contains(SECONDARY, &format!("version: {full} # kept in lock-step"));
    project.assert_file_contains(DATA_FILE, &format!("\"version\": \"{expected}\""));
    project.assert_file_contains(DATA_FILE, "\"build_date\": \"2025-06-09T22:04:00Z\"");
    project.assert_file_contains(DATA_FILE, "\"git_commit\": \"abc1234\"");
    project.assert_file_contains(CONSTANTS, &format!("mainAppVersion = '{expected}'"));
    project.assert_file_contains(CONSTANTS, "sharedLibraryBuildNumber = 202506092204;");
    project.assert_file_contains(CONSTANTS, "buildTimestamp = '2025-06-09T22:04:00Z'");

    assert_eq!(engine.record().unwrap().full(), full);
    assert_eq!(engine.check().unwrap().status, CheckStatus::Healthy);
}

#[test]
fn only_version_bearing_lines_change() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let before = project.representations();

    engine(&project)
        .increment(ChangeKind::Minor, SyncOptions::new())
        .unwrap();

    for (path, old) in before {
        let old = String::from_utf8(old).unwrap();
        let new = project.read(&path);
        assert_eq!(old.lines().count(), new.lines().count(), "{path}");
        for (a, b) in old.lines().zip(new.lines()) {
            let version_bearing = ["version", "build", "Version", "Build", "commit"]
                .iter()
                .any(|needle| a.contains(needle));
            if !version_bearing {
                assert_eq!(a, b, "{path}");
            }
        }
    }
}

#[test]
fn hand_written_data_file_keeps_its_layout() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let source = "{\"app_name\": \"Caf\\u00e9\", \"platforms\": [\"linux\", \"windows\"],\n \"ratio\": 1.50,\n \"version\" : \"3.5.5\", \"build_number\" : \"202501010000\",\n \"build_date\" : \"2025-01-01T00:00:00Z\", \"git_commit\" : \"unknown\"}\n";
    project.write(DATA_FILE, source);

    engine(&project)
        .increment(ChangeKind::Minor, SyncOptions::new())
        .unwrap();

    let expected = source
        .replace("3.5.5", "3.6.0")
        .replace("202501010000", "202506092204")
        .replace("2025-01-01T00:00:00Z", "2025-06-09T22:04:00Z")
        .replace("unknown", "abc1234");
    assert_eq!(project.read(DATA_FILE), expected);
}

#[test]
fn prepare_then_inject_then_restore() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let original = project.representations();
    let mut engine = engine(&project);

    engine.prepare(ChangeKind::Minor, SyncOptions::new()).unwrap();
    project.assert_file_contains(MANIFEST, &format!("version: 3.6.0+{SENTINEL}"));
    project.assert_file_contains(DATA_FILE, &format!("\"build_date\": \"{SENTINEL}\""));
    project.assert_file_contains(CONSTANTS, "mainAppBuildNumber = 0;");
    project.assert_file_contains(CONSTANTS, &format!("buildTimestamp = '{SENTINEL}'"));
    assert_eq!(engine.check().unwrap().status, CheckStatus::Pending);

    let report = engine.inject(SyncOptions::new()).unwrap();
    assert_eq!(report.record.full(), "3.6.0+202506092204");
    project.assert_file_contains(MANIFEST, "version: 3.6.0+202506092204");

    // Backups from prepare survive inject, so restore goes back past both
    let restored = engine.restore().unwrap();
    assert_eq!(restored.len(), 4);
    assert_eq!(project.representations(), original);
    assert!(!project.exists(".verstamp/journal.toml"));
    assert!(!project.exists("pubspec.yaml.verstamp.bak"));
}

#[test]
fn inject_on_pending_manifest_only() {
    let project = TestProject::manifest_only("1.0.0", SENTINEL);
    let mut engine = engine(&project);

    let report = engine.inject(SyncOptions::new()).unwrap();
    assert_eq!(report.written(), vec![MANIFEST]);
    assert_eq!(report.skipped().len(), 3);
    assert_eq!(project.read(MANIFEST).matches("1.0.0+202506092204").count(), 1);
    assert!(!project.exists(DATA_FILE));
}

#[test]
fn dry_run_leaves_every_byte_alone() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let before = project.snapshot();

    let report = engine(&project)
        .set("4.0.0", SyncOptions::dry_run())
        .unwrap();

    assert!(report.release_advised());
    assert!(report.outcomes.iter().all(|o| o.diff.is_some()));
    assert_eq!(project.snapshot(), before);
}

#[test]
fn malformed_set_touches_nothing() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let before = project.snapshot();

    let err = engine(&project).set("3.5", SyncOptions::new()).unwrap_err();
    assert!(err.to_string().contains("3.5"));
    assert_eq!(project.snapshot(), before);
}

#[test]
fn broken_representation_aborts_before_any_write() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    project.write(DATA_FILE, "{ \"version\": ");
    let before = project.representations();

    let err = engine(&project)
        .increment(ChangeKind::Patch, SyncOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Representation { ref path, .. } if path == DATA_FILE));
    assert_eq!(project.representations(), before);
    assert!(!project.exists(".verstamp/journal.toml"));
}

#[test]
fn missing_manifest_reports_its_path() {
    let project = TestProject::new();
    let err = engine(&project).record().unwrap_err();
    assert!(matches!(err, Error::ManifestNotFound { .. }));
    assert!(err.to_string().contains("pubspec.yaml"));
}

#[test]
fn interrupted_journal_blocks_inject_until_restore() {
    let project = TestProject::with_record("1.0.0", SENTINEL);
    let original = project.representations();
    let mut engine = engine(&project);

    // A pass that died after backing up and half-writing
    engine.prepare(ChangeKind::Patch, SyncOptions::new()).unwrap();
    let journal = project.read(".verstamp/journal.toml");
    project.write(
        ".verstamp/journal.toml",
        &journal.replace("state = \"settled\"", "state = \"writing\""),
    );

    let err = engine.inject(SyncOptions::new()).unwrap_err();
    assert!(matches!(err, Error::InterruptedRun { .. }));
    assert_eq!(engine.check().unwrap().status, CheckStatus::Broken);
    assert_eq!(
        engine.backups().unwrap().journal,
        Some(JournalState::Writing)
    );

    engine.restore().unwrap();
    assert_eq!(project.representations(), original);
    engine.inject(SyncOptions::new()).unwrap();
}

#[test]
fn cleanup_is_idempotent_and_keeps_changes() {
    let project = TestProject::with_record("1.0.0", "202501010000");
    let mut engine = engine(&project);
    engine.increment(ChangeKind::Patch, SyncOptions::new()).unwrap();

    let report = engine.backups().unwrap();
    assert!(report.files.iter().all(|f| f.state == BackupState::BackedUp));

    assert_eq!(engine.cleanup().unwrap(), 4);
    let after_first = project.snapshot();
    assert_eq!(engine.cleanup().unwrap(), 0);
    assert_eq!(project.snapshot(), after_first);
    assert!(engine.restore().unwrap().is_empty());
    assert_eq!(engine.record().unwrap().semantic.to_string(), "1.0.1");
}

#[test]
fn corrupted_backup_is_refused() {
    let project = TestProject::with_record("1.0.0", "202501010000");
    let mut engine = engine(&project);
    engine.increment(ChangeKind::Patch, SyncOptions::new()).unwrap();
    project.write("pubspec.yaml.verstamp.bak", "version: 9.9.9+202501010000\n");
    let before = project.snapshot();

    let err = engine.restore().unwrap_err();
    assert!(matches!(err, Error::BackupCorrupted { .. }));
    assert_eq!(project.snapshot(), before);
}

#[test]
fn held_lock_is_reported() {
    let project = TestProject::with_record("1.0.0", "202501010000");
    let _held =
        InvocationLock::acquire(&NormalizedPath::new(project.path(".verstamp/lock"))).unwrap();

    let err = engine(&project)
        .inject(SyncOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::LockHeld { .. }));
}

#[test]
fn hand_edited_representation_is_drift() {
    let project = TestProject::with_record("2.0.0", "202501010000");
    let data = project.read(DATA_FILE).replace("\"2.0.0\"", "\"1.9.0\"");
    project.write(DATA_FILE, &data);

    let report = engine(&project).check().unwrap();
    assert_eq!(report.status, CheckStatus::Drifted);
    assert_eq!(report.drifted.len(), 1);
    assert_eq!(report.drifted[0].path, DATA_FILE);

    // Any mutation brings everything back in line
    let mut engine = engine(&project);
    engine.inject(SyncOptions::new()).unwrap();
    assert_eq!(engine.check().unwrap().status, CheckStatus::Healthy);
}

#[test]
fn undecodable_representation_breaks_check_without_failing_it() {
    let project = TestProject::with_record("2.0.0", "202501010000");
    std::fs::write(project.path(CONSTANTS), b"class SharedVersion {\xff\xfe}\n").unwrap();

    let report = engine(&project).check().unwrap();
    assert_eq!(report.status, CheckStatus::Broken);
    assert!(
        report.messages.iter().any(|m| m.starts_with(CONSTANTS)),
        "{:?}",
        report.messages
    );
}

#[test]
fn configured_layout_is_honored() {
    let project = TestProject::new();
    project.write("app/pubspec.yaml", "name: app\nversion: 1.0.0+202501010000\n");
    project.write("app/version.json", "{\"version\": \"1.0.0\"}\n");
    project.write_config(
        r#"
secondary = []

[manifest]
path = "app/pubspec.yaml"

[data_file]
path = "app/version.json"

[constants]
enabled = false

[backup]
suffix = ".orig"
"#,
    );

    let mut engine = engine(&project);
    let report = engine.increment(ChangeKind::Minor, SyncOptions::new()).unwrap();
    assert_eq!(report.outcomes.len(), 2);
    project.assert_file_contains("app/pubspec.yaml", "version: 1.1.0+202506092204");
    assert_eq!(
        project.read("app/version.json"),
        "{\"version\": \"1.1.0\",\"build_number\": \"202506092204\",\"build_date\": \"2025-06-09T22:04:00Z\",\"git_commit\": \"abc1234\"}\n"
    );
    assert!(project.exists("app/pubspec.yaml.orig"));
}

#[test]
fn store_exposes_configured_representations() {
    let project = TestProject::with_record("1.0.0", "202501010000");
    let store = FileStore::open(project.root()).unwrap();
    let paths: Vec<_> = store
        .representations()
        .iter()
        .map(|r| r.path().to_string())
        .collect();
    assert_eq!(paths, vec![MANIFEST, DATA_FILE, CONSTANTS, SECONDARY]);
}
