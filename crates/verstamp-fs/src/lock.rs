//! Advisory lock held for the duration of a mutating invocation

use std::fs::{self, File, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Exclusive advisory lock on a sentinel file.
///
/// Two invocations against the same checkout would interleave their backups
/// and writes, so every mutating command takes this lock first. Acquisition
/// never blocks: a held lock is reported as [`Error::LockHeld`]. The lock is
/// released when the value is dropped.
#[derive(Debug)]
pub struct InvocationLock {
    file: File,
    path: NormalizedPath,
}

impl InvocationLock {
    /// Try to take the lock at `path`, creating the file if needed.
    pub fn acquire(path: &NormalizedPath) -> Result<Self> {
        let native_path = path.to_native();
        if let Some(parent) = native_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native_path)
            .map_err(|e| Error::io(&native_path, e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(Error::LockHeld { path: native_path });
            }
            return Err(Error::LockFailed { path: native_path });
        }

        // Holder pid is informational only
        file.set_len(0).map_err(|e| Error::io(&native_path, e))?;
        writeln!(file, "{}", std::process::id()).map_err(|e| Error::io(&native_path, e))?;

        tracing::debug!(path = %path, "acquired invocation lock");
        Ok(Self {
            file,
            path: path.clone(),
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for InvocationLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path, error = %e, "failed to release invocation lock");
        }
    }
}
