//! versions::repository
//!
//! Repository initialization and health checks.
//!
//! # Initialization
//!
//! [`VersionStore::open`] makes sure `<repos_dir>/<repo_name>` is a usable
//! repository:
//! - missing directory or repository: create it with HEAD on the default
//!   branch, then commit the marker file
//! - repository without any refs (an earlier initialization died before its
//!   first commit): commit the marker file
//! - repository with history: leave it untouched
//!
//! Opening is idempotent and safe to race: the marker commit is written
//! under the repository lock and only if no ref exists yet.

use std::path::Path;

use tracing::{debug, info};

use super::{StoreSettings, VersionError, VersionStore};
use crate::core::config::Config;
use crate::core::naming::MARKER_FILE;
use crate::core::ops::RepoLock;
use crate::core::types::RefName;
use crate::git::{Git, GitError, HeadPointer};

/// Contents of the marker file on the default branch.
pub const MARKER_CONTENT: &str =
    "# Proompt Git Repository\n\nThis repository contains versioned prompts and snippets.\n";

/// Message of the marker commit.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

impl VersionStore {
    /// Open the store, creating and seeding the repository if needed.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Initialization`] if the directory cannot be
    /// created or the repository cannot be opened, initialized or seeded.
    pub fn open(settings: StoreSettings) -> Result<Self, VersionError> {
        let paths = settings.paths();
        let repo_dir = paths.repo_dir();

        paths
            .ensure_repo_dir()
            .map_err(|e| VersionError::Initialization {
                message: format!("cannot create {}: {}", repo_dir.display(), e),
                source: None,
            })?;

        let git = match Git::open(&repo_dir) {
            Ok(git) => git,
            Err(GitError::NotARepo { .. }) => {
                info!(path = %repo_dir.display(), "creating version repository");
                Git::init(&repo_dir, &settings.default_branch).map_err(|e| {
                    VersionError::initialization(
                        format!("cannot initialize {}", repo_dir.display()),
                        e,
                    )
                })?
            }
            Err(e) => {
                return Err(VersionError::initialization(
                    format!("cannot open {}", repo_dir.display()),
                    e,
                ))
            }
        };

        let store = Self {
            settings,
            paths,
            write_lock: std::sync::Mutex::new(()),
        };
        store.seed_if_empty(&git)?;

        debug!(path = %repo_dir.display(), "version repository ready");
        Ok(store)
    }

    /// Open the store described by loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, VersionError> {
        let settings = StoreSettings::from_config(config)?;
        Self::open(settings)
    }

    /// Commit the marker file if the repository has no refs at all.
    fn seed_if_empty(&self, git: &Git) -> Result<(), VersionError> {
        let _lock = RepoLock::acquire_blocking(&self.paths)?;

        let has_refs = git.has_any_refs().map_err(|e| {
            VersionError::initialization("cannot enumerate repository refs", e)
        })?;
        if has_refs {
            return Ok(());
        }

        let default_ref = self.default_ref();
        let seed = || -> Result<(), GitError> {
            git.set_head_pointer(&HeadPointer::Symbolic(default_ref.clone()))?;
            git.write_worktree_file(Path::new(MARKER_FILE), MARKER_CONTENT.as_bytes())?;
            git.stage_path(Path::new(MARKER_FILE))?;
            git.commit_index(
                &default_ref,
                INITIAL_COMMIT_MESSAGE,
                &self.settings.author,
                &[],
            )?;
            Ok(())
        };
        seed().map_err(|e| VersionError::initialization("cannot create initial commit", e))?;

        info!(branch = %self.settings.default_branch, "created initial commit");
        Ok(())
    }

    /// Check that the default branch and HEAD both resolve to commits.
    ///
    /// No repair is attempted.
    pub fn validate(&self) -> Result<(), VersionError> {
        let git = self.git()?;

        let default_ref = self.default_ref();
        git.resolve_ref(default_ref.as_str()).map_err(|e| {
            VersionError::initialization(
                format!("default branch {} does not resolve", default_ref),
                e,
            )
        })?;

        git.head_oid()
            .map_err(|e| VersionError::initialization("HEAD does not resolve", e))?;

        debug!(path = %self.paths.repo_dir().display(), "repository validated");
        Ok(())
    }

    /// Open a fresh repository handle for one operation.
    pub(crate) fn git(&self) -> Result<Git, VersionError> {
        let repo_dir = self.paths.repo_dir();
        Git::open(&repo_dir).map_err(|e| {
            VersionError::initialization(format!("cannot open {}", repo_dir.display()), e)
        })
    }

    /// Full ref of the default branch.
    pub(crate) fn default_ref(&self) -> RefName {
        RefName::for_branch(&self.settings.default_branch)
    }
}
