//! Project root detection
//!
//! Commands work from anywhere inside a checkout, the way git does: the root
//! is the nearest ancestor holding `.verstamp/config.toml` or the manifest.

use std::path::{Path, PathBuf};

use verstamp_core::config::{CONFIG_FILE, DEFAULT_MANIFEST, STATE_DIR};

/// Walk up from `start` to the first directory that looks like a project.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            dir.join(STATE_DIR).join(CONFIG_FILE).is_file() || dir.join(DEFAULT_MANIFEST).is_file()
        })
        .map(Path::to_path_buf)
}

/// The explicit root if given, otherwise the detected one, otherwise `cwd`.
///
/// Falling back to `cwd` lets the store report the missing manifest with
/// its full path.
pub fn resolve_root(explicit: Option<PathBuf>, cwd: &Path) -> PathBuf {
    explicit
        .map(|root| if root.is_absolute() { root } else { cwd.join(root) })
        .or_else(|| find_root(cwd))
        .unwrap_or_else(|| cwd.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_manifest_in_an_ancestor() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pubspec.yaml"), "version: 1.0.0+BUILD_TIME_PLACEHOLDER\n").unwrap();
        let nested = temp.path().join("lib/src/widgets");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn config_directory_marks_a_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".verstamp")).unwrap();
        fs::write(temp.path().join(".verstamp/config.toml"), "").unwrap();
        let nested = temp.path().join("app");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn explicit_root_wins() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_root(Some(PathBuf::from("sub")), temp.path());
        assert_eq!(resolved, temp.path().join("sub"));
    }
}
