//! core::paths
//!
//! Centralized path routing for version store locations.
//!
//! # Storage Layout
//!
//! Everything lives under `<repos_dir>/<repo_name>/`:
//! - `README.md` - Marker file committed on the default branch
//! - `content.json` - The one file of an entity commit (only present in the
//!   worktree while a transaction holds HEAD on an entity branch)
//! - `.git/` - The repository itself
//! - `.git/versions/lock` - Exclusive write lock
//!
//! No other module joins these names by hand; everything goes through
//! [`StorePaths`].
//!
//! # Example
//!
//! ```
//! use proompt_versions::core::paths::StorePaths;
//! use std::path::PathBuf;
//!
//! let paths = StorePaths::new(PathBuf::from("/data/repos"), "git-repo");
//!
//! assert_eq!(paths.repo_dir(), PathBuf::from("/data/repos/git-repo"));
//! assert_eq!(
//!     paths.lock_path(),
//!     PathBuf::from("/data/repos/git-repo/.git/versions/lock")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::naming::{CONTENT_FILE, MARKER_FILE};

/// Centralized path routing for the version store.
///
/// # Invariants
///
/// - The repository is always non-bare, so `git_dir` is `<repo_dir>/.git`
/// - Store-private state lives under `git_dir`, never in the worktree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    repos_dir: PathBuf,
    repo_name: String,
}

impl StorePaths {
    /// Create paths for repository `repo_name` under `repos_dir`.
    pub fn new(repos_dir: PathBuf, repo_name: impl Into<String>) -> Self {
        Self {
            repos_dir,
            repo_name: repo_name.into(),
        }
    }

    /// Parent directory holding repositories.
    pub fn repos_dir(&self) -> &Path {
        &self.repos_dir
    }

    /// Name of the repository directory.
    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    // =========================================================================
    // Repository paths
    // =========================================================================

    /// The repository's working directory.
    pub fn repo_dir(&self) -> PathBuf {
        self.repos_dir.join(&self.repo_name)
    }

    /// The repository's `.git` directory.
    pub fn git_dir(&self) -> PathBuf {
        self.repo_dir().join(".git")
    }

    /// Directory for store-private state.
    ///
    /// This is `<repo_dir>/.git/versions/`.
    pub fn versions_dir(&self) -> PathBuf {
        self.git_dir().join("versions")
    }

    /// The write lock file.
    ///
    /// This is `<repo_dir>/.git/versions/lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.versions_dir().join("lock")
    }

    // =========================================================================
    // Worktree paths
    // =========================================================================

    /// The marker file on the default branch.
    pub fn marker_path(&self) -> PathBuf {
        self.repo_dir().join(MARKER_FILE)
    }

    /// The content file written by a transaction.
    pub fn content_path(&self) -> PathBuf {
        self.repo_dir().join(CONTENT_FILE)
    }

    /// Create `repos_dir/repo_name` and its parents if needed.
    ///
    /// # Errors
    ///
    /// Returns an IO error if directory creation fails.
    pub fn ensure_repo_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.repo_dir())
    }

    /// Create the store-private directory if needed.
    pub fn ensure_versions_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.versions_dir())
    }
}
