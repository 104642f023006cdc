//! versions
//!
//! Git-backed version store for prompts and snippets.
//!
//! # Architecture
//!
//! One shared, non-bare repository holds every entity's history. Each entity
//! owns an orphan branch `<kind-plural>/<id>` whose commits each contain a
//! single `content.json` snapshot. The default branch carries only a marker
//! `README.md` and is where HEAD rests between operations.
//!
//! # Modules
//!
//! - [`repository`] - Initialization and health checks
//! - [`transaction`] - HEAD redirect, write, commit, restore
//! - [`lifecycle`] - Create / update / delete per entity
//! - [`history`] - Ancestry walks and historical snapshot reads
//! - [`error`] - Error taxonomy
//!
//! # Concurrency
//!
//! [`VersionStore`] is `Send + Sync`. Every operation opens its own
//! repository handle, so reads never wait. Mutations share one HEAD and
//! worktree, so they are serialized by an in-process mutex and a
//! cross-process [`RepoLock`](crate::core::ops::RepoLock).
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use proompt_versions::core::entity::{Snippet, VersionedEntity};
//! use proompt_versions::core::ops::Interrupt;
//! use proompt_versions::core::types::EntityId;
//! use proompt_versions::versions::{StoreSettings, VersionStore};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let store = VersionStore::open(StoreSettings::new(temp.path())).unwrap();
//!
//! let mut snippet = Snippet {
//!     id: EntityId::generate(),
//!     title: "Greeting".into(),
//!     content: "Hello!".into(),
//!     description: None,
//!     tags: vec![],
//!     created_at: Utc::now(),
//!     updated_at: Utc::now(),
//! };
//! store.create_branch(&snippet, "", &Interrupt::none()).unwrap();
//!
//! snippet.content = "Hello there!".into();
//! store.update_branch(&snippet, "friendlier", &Interrupt::none()).unwrap();
//!
//! let history = store.history(Snippet::KIND, &snippet.id).unwrap();
//! assert_eq!(history.len(), 2);
//! assert_eq!(history[0].summary, "Update: Greeting");
//! ```

pub mod error;
pub mod history;
pub mod lifecycle;
pub mod repository;
pub mod transaction;

pub use error::{ErrorKind, StageError, TxStage, VersionError};
pub use history::CommitRecord;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::core::config::{Config, ConfigError};
use crate::core::paths::StorePaths;
use crate::core::types::BranchName;
use crate::git::Identity;

/// Where the store lives and how it signs commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Parent directory of the repository
    pub repos_dir: PathBuf,
    /// Repository directory name
    pub repo_name: String,
    /// Branch holding the marker commit
    pub default_branch: BranchName,
    /// Synthetic author and committer
    pub author: Identity,
    /// Queue behind a concurrent writer instead of failing with
    /// [`VersionError::Lock`]
    pub wait_for_lock: bool,
}

impl StoreSettings {
    /// Settings with the default repository name, branch and author.
    pub fn new(repos_dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            repos_dir: repos_dir.into(),
            repo_name: defaults.repo_name().to_string(),
            default_branch: defaults.default_branch(),
            author: Identity::new(defaults.author_name(), defaults.author_email()),
            wait_for_lock: true,
        }
    }

    /// Settings from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            repos_dir: config.repos_dir()?,
            repo_name: config.repo_name().to_string(),
            default_branch: config.default_branch(),
            author: Identity::new(config.author_name(), config.author_email()),
            wait_for_lock: true,
        })
    }

    pub fn with_repo_name(mut self, name: impl Into<String>) -> Self {
        self.repo_name = name.into();
        self
    }

    pub fn with_default_branch(mut self, branch: BranchName) -> Self {
        self.default_branch = branch;
        self
    }

    pub fn with_author(mut self, author: Identity) -> Self {
        self.author = author;
        self
    }

    pub fn with_lock_wait(mut self, wait: bool) -> Self {
        self.wait_for_lock = wait;
        self
    }

    /// Path routing for these settings.
    pub fn paths(&self) -> StorePaths {
        StorePaths::new(self.repos_dir.clone(), self.repo_name.clone())
    }
}

/// Handle to an initialized version store.
///
/// Construct with [`VersionStore::open`]; share across threads behind an
/// `Arc`.
#[derive(Debug)]
pub struct VersionStore {
    settings: StoreSettings,
    paths: StorePaths,
    /// Serializes mutations within this process.
    write_lock: Mutex<()>,
}

impl VersionStore {
    /// The settings the store was opened with.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Path routing for the store.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }
}
