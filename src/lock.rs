//! File-based locking for single-process ownership of a database directory.
//!
//! Cross-platform (fs2) advisory locks:
//! - Exclusive, non-blocking: exactly one process owns the directory.
//! - Contention is reported as Error::DbLocked (не обычная I/O ошибка),
//!   чтобы вызывающий код мог сказать "directory is locked".
//!
//! Lock file path: <root>/LOCK
//! Lock is released on Drop.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};

#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

/// Try to acquire an exclusive lock on the sentinel path.
/// Returns Error::DbLocked if another holder has it.
pub fn acquire_exclusive(path: &Path) -> Result<LockGuard> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(LockGuard {
            file,
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(Error::DbLocked),
        Err(e) => Err(Error::Io(e)),
    }
}
