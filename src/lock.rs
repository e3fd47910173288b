//! Exclusive lock on the work root.
//!
//! Working copies are mutated in place by clone, checkout and make. Two
//! batches sharing a work root would trample each other, so a batch holds an
//! advisory lock on `<work-root>/.apertium-builder.lock` while it runs.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const LOCK_FILENAME: &str = ".apertium-builder.lock";

/// Held for the lifetime of a batch. Dropping it releases the lock.
#[derive(Debug)]
pub struct WorkRootLock {
    file: File,
    path: PathBuf,
}

impl WorkRootLock {
    /// Take the lock without blocking, failing if another process holds it.
    pub fn acquire(work_root: &Path) -> Result<Self> {
        fs::create_dir_all(work_root)
            .with_context(|| format!("creating work directory '{}'", work_root.display()))?;
        let path = work_root.join(LOCK_FILENAME);

        // Never unlinked, only unlocked.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            return Err(anyhow::anyhow!(
                "work directory is in use by another build: {}",
                path.display()
            ));
        }

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkRootLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_lock_is_refused() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("build");

        let held = WorkRootLock::acquire(&work).unwrap();
        assert!(held.path().is_file());

        let err = WorkRootLock::acquire(&work).unwrap_err();
        assert!(err.to_string().contains("in use"));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();

        let first = WorkRootLock::acquire(temp.path()).unwrap();
        drop(first);

        assert!(WorkRootLock::acquire(temp.path()).is_ok());
    }
}
