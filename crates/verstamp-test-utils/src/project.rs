//! [`TestProject`]: a temporary checkout with every version representation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const MANIFEST: &str = "pubspec.yaml";
pub const DATA_FILE: &str = "assets/version.json";
pub const CONSTANTS: &str = "lib/shared/lib/version.dart";
pub const SECONDARY: &str = "lib/shared/pubspec.yaml";

/// Every representation path at its default location.
pub const ALL: [&str; 4] = [MANIFEST, DATA_FILE, CONSTANTS, SECONDARY];

/// Contents of the main package manifest.
pub fn manifest_yaml(version: &str, build: &str) -> String {
    format!(
        "name: cloudtolocalllm\n\
description: Local LLM bridge.\n\
publish_to: 'none'\n\
\n\
version: {version}+{build}\n\
\n\
environment:\n  sdk: '>=3.0.0 <4.0.0'\n\
\n\
dependencies:\n  flutter:\n    sdk: flutter\n  shared:\n    path: lib/shared\n"
    )
}

/// Contents of the shared sub-package manifest.
pub fn secondary_yaml(version: &str, build: &str) -> String {
    format!("name: shared\nversion: {version}+{build} # kept in lock-step\n")
}

/// Contents of the bundled JSON version asset.
pub fn data_json(version: &str, build: &str, date: &str, commit: &str) -> String {
    format!(
        "{{\n  \"app_name\": \"CloudToLocalLLM\",\n  \"version\": \"{version}\",\n  \"build_number\": \"{build}\",\n  \"build_date\": \"{date}\",\n  \"git_commit\": \"{commit}\"\n}}\n"
    )
}

/// Contents of the shared Dart constants file. `build` is written as an
/// `int` literal, so pass `0` for a pending build.
pub fn constants_dart(version: &str, build: &str, timestamp: &str) -> String {
    format!(
        "/// Generated version constants.\n\
class SharedVersion {{\n\
  static const String mainAppVersion = '{version}';\n\
  static const int mainAppBuildNumber = {build};\n\
\n\
  static const String tunnelManagerVersion = '{version}';\n\
  static const int tunnelManagerBuildNumber = {build};\n\
\n\
  static const String sharedLibraryVersion = '{version}';\n\
  static const int sharedLibraryBuildNumber = {build};\n\
\n\
  static const String buildTimestamp = '{timestamp}';\n\
}}\n"
    )
}

/// A temporary directory laid out like a product checkout.
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// An empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestProject::new: failed to create temp dir"),
        }
    }

    /// A project whose four representations all carry `version+build`.
    ///
    /// `build` is either twelve digits or `BUILD_TIME_PLACEHOLDER`.
    pub fn with_record(version: &str, build: &str) -> Self {
        let project = Self::new();
        let pending = build == "BUILD_TIME_PLACEHOLDER";
        let date = if pending {
            "BUILD_TIME_PLACEHOLDER".to_string()
        } else {
            format!(
                "{}-{}-{}T{}:{}:00Z",
                &build[0..4],
                &build[4..6],
                &build[6..8],
                &build[8..10],
                &build[10..12]
            )
        };
        let int_build = if pending { "0" } else { build };

        project.write(MANIFEST, &manifest_yaml(version, build));
        project.write(SECONDARY, &secondary_yaml(version, build));
        project.write(DATA_FILE, &data_json(version, build, &date, "unknown"));
        project.write(CONSTANTS, &constants_dart(version, int_build, &date));
        project
    }

    /// Only the required manifest.
    pub fn manifest_only(version: &str, build: &str) -> Self {
        let project = Self::new();
        project.write(MANIFEST, &manifest_yaml(version, build));
        project
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestProject::write: {}: {e}", path.display()));
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestProject::read: {}: {e}", path.display()))
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Write `.verstamp/config.toml`.
    pub fn write_config(&self, toml: &str) {
        self.write(".verstamp/config.toml", toml);
    }

    /// Bytes of every file under the root, keyed by relative path.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        fn walk(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    let relative = path
                        .strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/");
                    out.insert(relative, fs::read(&path).unwrap());
                }
            }
        }

        let mut out = BTreeMap::new();
        walk(self.root(), self.root(), &mut out);
        out
    }

    /// Snapshot restricted to the four representation files.
    pub fn representations(&self) -> BTreeMap<String, Vec<u8>> {
        self.snapshot()
            .into_iter()
            .filter(|(path, _)| ALL.contains(&path.as_str()))
            .collect()
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {relative} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
