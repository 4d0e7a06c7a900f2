//! Release lifecycle across every crate
//!
//! Drives the engine through arbitrary sequences of commands against a real
//! project on disk and checks that every representation stays in step.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use verstamp_content::{
    ConstantsHandler, DataFileHandler, ManifestHandler, SemanticVersion, VersionFormat,
};
use verstamp_core::{
    ChangeKind, CheckStatus, FileStore, FixedClock, FixedRevision, SyncEngine, SyncOptions,
    VersionStore,
};
use verstamp_fs::NormalizedPath;
use verstamp_fs::io::read_text;
use verstamp_test_utils::project::{CONSTANTS, DATA_FILE, MANIFEST, SECONDARY, TestProject};

#[derive(Debug, Clone)]
enum Step {
    Increment(ChangeKind),
    Prepare(ChangeKind),
    Set(u64, u64, u64),
    Inject,
}

fn kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Major),
        Just(ChangeKind::Minor),
        Just(ChangeKind::Patch),
        Just(ChangeKind::Build),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        kind().prop_map(Step::Increment),
        kind().prop_map(Step::Prepare),
        (0u64..50, 0u64..50, 0u64..50).prop_map(|(a, b, c)| Step::Set(a, b, c)),
        Just(Step::Inject),
    ]
}

fn engine_at(project: &TestProject, minute: i64) -> SyncEngine {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    SyncEngine::new(
        Box::new(FileStore::open(project.root()).unwrap()),
        Box::new(FixedClock(start + Duration::minutes(minute))),
        Box::new(FixedRevision::new("abc1234")),
    )
}

/// Every representation read independently through its adapter.
fn read_all(project: &TestProject) -> Vec<(String, Option<SemanticVersion>, Option<String>)> {
    let constants = ConstantsHandler::new(["mainApp", "tunnelManager", "sharedLibrary"]).unwrap();
    let adapters: [(&str, &dyn VersionFormat); 4] = [
        (MANIFEST, &ManifestHandler),
        (DATA_FILE, &DataFileHandler),
        (CONSTANTS, &constants),
        (SECONDARY, &ManifestHandler),
    ];
    adapters
        .iter()
        .map(|(path, adapter)| {
            let source = read_text(&NormalizedPath::new(project.path(path))).unwrap();
            let fields = adapter.read(&source).unwrap();
            (
                path.to_string(),
                fields.semantic,
                fields.build.map(|b| b.to_string()),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn representations_never_disagree(steps in prop::collection::vec(step(), 1..6)) {
        let project = TestProject::with_record("1.0.0", "202401010000");

        for (minute, step) in steps.iter().enumerate() {
            let mut engine = engine_at(&project, minute as i64);
            let before = engine.record().unwrap();
            let report = match step {
                Step::Increment(kind) => engine.increment(*kind, SyncOptions::new()),
                Step::Prepare(kind) => engine.prepare(*kind, SyncOptions::new()),
                Step::Set(a, b, c) => engine.set(&format!("{a}.{b}.{c}"), SyncOptions::new()),
                Step::Inject => engine.inject(SyncOptions::new()),
            }
            .unwrap();

            match step {
                Step::Increment(kind) | Step::Prepare(kind) => {
                    prop_assert_eq!(report.record.semantic, before.semantic.bump(*kind).unwrap());
                }
                Step::Set(a, b, c) => {
                    prop_assert_eq!(report.record.semantic, SemanticVersion::new(*a, *b, *c));
                }
                Step::Inject => prop_assert_eq!(report.record.semantic, before.semantic),
            }
            prop_assert_eq!(report.record.build.is_pending(), matches!(step, Step::Prepare(_)));

            let expected = report.record.clone();
            for (path, semantic, build) in read_all(&project) {
                prop_assert_eq!(semantic, Some(expected.semantic), "{}", path);
                prop_assert_eq!(build, Some(expected.build.to_string()), "{}", path);
            }

            let status = engine.check().unwrap().status;
            let expected_status = if expected.build.is_pending() {
                CheckStatus::Pending
            } else {
                CheckStatus::Healthy
            };
            prop_assert_eq!(status, expected_status);
        }
    }

    #[test]
    fn set_then_get_round_trips(major in 0u64..1000, minor in 0u64..1000, patch in 0u64..1000) {
        let project = TestProject::with_record("0.0.1", "202401010000");
        let version = format!("{major}.{minor}.{patch}");

        engine_at(&project, 0).set(&version, SyncOptions::new()).unwrap();

        let store = FileStore::open(project.root()).unwrap();
        prop_assert_eq!(store.semantic().unwrap().to_string(), version);
        prop_assert_eq!(store.build().unwrap().to_string(), "202501010000");
    }
}

#[test]
fn restore_after_a_long_session_returns_to_the_start() {
    let project = TestProject::with_record("3.5.5", "202501010000");
    let original = project.representations();

    engine_at(&project, 1)
        .prepare(ChangeKind::Minor, SyncOptions::new())
        .unwrap();
    engine_at(&project, 2).inject(SyncOptions::new()).unwrap();
    engine_at(&project, 3)
        .increment(ChangeKind::Patch, SyncOptions::new())
        .unwrap();

    let restored = engine_at(&project, 4).restore().unwrap();
    assert_eq!(restored.len(), 4);
    assert_eq!(project.representations(), original);
}
