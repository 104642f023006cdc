//! core::ops::lock
//!
//! Exclusive repository lock for version store mutations.
//!
//! # Architecture
//!
//! Branch lifecycle operations move the repository's single HEAD, so only one
//! writer may run at a time. Inside one process the [`VersionStore`] mutex
//! serializes writers; this lock extends that guarantee to other processes
//! sharing the same repository directory.
//!
//! [`VersionStore`]: crate::versions::VersionStore
//!
//! # Storage
//!
//! - `<repo_dir>/.git/versions/lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is held for the entire mutation, pointer restore included
//! - Lock is automatically released on drop (RAII pattern)
//! - [`RepoLock::acquire`] fails fast; [`RepoLock::acquire_blocking`] waits
//!
//! # Example
//!
//! ```
//! use proompt_versions::core::ops::lock::{LockError, RepoLock};
//! use proompt_versions::core::paths::StorePaths;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let paths = StorePaths::new(temp.path().to_path_buf(), "repo");
//!
//! let lock = RepoLock::acquire(&paths).unwrap();
//! assert!(matches!(RepoLock::acquire(&paths), Err(LockError::AlreadyLocked)));
//!
//! // Lock automatically released when dropped
//! drop(lock);
//! assert!(RepoLock::acquire(&paths).is_ok());
//! ```

use std::fs::{File, OpenOptions};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::StorePaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another writer already holds the lock.
    #[error("repository is locked by another writer")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on the repository.
///
/// The lock is released when this guard is dropped, even if the
/// operation panics.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl RepoLock {
    /// Attempt to acquire the repository lock without waiting.
    ///
    /// Used by stores opened with `wait_for_lock` off.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another writer holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &StorePaths) -> Result<Self, LockError> {
        let file = Self::open_lock_file(paths)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => {
                // fs2 reports contention as a platform-specific error on some targets
                if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                    Err(LockError::AlreadyLocked)
                } else {
                    Err(LockError::AcquireFailed(e.to_string()))
                }
            }
        }
    }

    /// Acquire the repository lock, waiting for other writers to finish.
    ///
    /// Used by lifecycle operations, which queue behind a concurrent writer
    /// instead of failing, and by repository seeding.
    pub fn acquire_blocking(paths: &StorePaths) -> Result<Self, LockError> {
        let file = Self::open_lock_file(paths)?;

        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;

        Ok(Self { file })
    }

    fn open_lock_file(paths: &StorePaths) -> Result<File, LockError> {
        let dir = paths.versions_dir();
        paths.ensure_versions_dir().map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = paths.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        // Closing the file would release it too; unlock eagerly
        let _ = self.file.unlock();
    }
}
