//! versions::error
//!
//! Error taxonomy for the version store.
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the class
//! of problem (not found, conflict, I/O, ...) without matching variants.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::ops::{InterruptReason, LockError};
use crate::core::types::{BranchName, TypeError};
use crate::git::GitError;

/// Step of a worktree transaction at which a mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStage {
    /// Redirecting HEAD to the target branch
    RedirectPointer,
    /// Clearing worktree and index for an orphan commit
    ClearWorktree,
    /// Checking out the existing branch tip
    Checkout,
    /// Serializing the snapshot
    Serialize,
    /// Writing `content.json`
    WriteFile,
    /// Staging `content.json`
    StageFile,
    /// Creating the commit
    Commit,
    /// Putting HEAD back and resynchronizing the worktree
    RestorePointer,
    /// Removing a branch ref
    DeleteRef,
}

impl TxStage {
    pub const ALL: [TxStage; 9] = [
        TxStage::RedirectPointer,
        TxStage::ClearWorktree,
        TxStage::Checkout,
        TxStage::Serialize,
        TxStage::WriteFile,
        TxStage::StageFile,
        TxStage::Commit,
        TxStage::RestorePointer,
        TxStage::DeleteRef,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxStage::RedirectPointer => "pointer-redirect",
            TxStage::ClearWorktree => "worktree-clear",
            TxStage::Checkout => "checkout",
            TxStage::Serialize => "serialization",
            TxStage::WriteFile => "file-write",
            TxStage::StageFile => "index-add",
            TxStage::Commit => "commit",
            TxStage::RestorePointer => "pointer-restore",
            TxStage::DeleteRef => "ref-delete",
        }
    }
}

impl std::fmt::Display for TxStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a failed mutation stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Simulated failure from fault injection.
    #[error("injected fault")]
    Injected,
}

/// Coarse classification of a [`VersionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Storage unavailable or corrupt.
    Initialization,
    /// Branch or version does not exist.
    NotFound,
    /// Branch already exists.
    Conflict,
    /// Git or filesystem failure during an operation.
    Io,
    /// Stored content does not match the snapshot schema.
    Schema,
    /// Cancelled or past its deadline.
    Interrupted,
    /// Write lock could not be taken.
    Lock,
    /// Caller passed malformed input.
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Initialization => "initialization",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Io => "io",
            ErrorKind::Schema => "schema",
            ErrorKind::Interrupted => "interrupted",
            ErrorKind::Lock => "lock",
            ErrorKind::InvalidInput => "invalid-input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from version store operations.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Repository could not be created, opened or validated.
    #[error("version store unavailable: {message}")]
    Initialization {
        message: String,
        #[source]
        source: Option<GitError>,
    },

    #[error("branch not found: {branch}")]
    BranchNotFound { branch: BranchName },

    /// The hash does not name a version of this entity.
    #[error("version {hash} not found on {branch}")]
    VersionNotFound { branch: BranchName, hash: String },

    #[error("branch already exists: {branch}")]
    BranchExists { branch: BranchName },

    /// A transaction stage failed. HEAD was restored before this was
    /// returned unless `stage` is `RestorePointer`.
    #[error("{stage} failed on {branch}: {source}")]
    Mutation {
        stage: TxStage,
        branch: BranchName,
        #[source]
        source: StageError,
    },

    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// The stored content could not be decoded.
    #[error("version {hash} on {branch} is unreadable: {source}")]
    UnreadableVersion {
        branch: BranchName,
        hash: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{stage} interrupted on {branch}: {reason}")]
    Interrupted {
        stage: TxStage,
        branch: BranchName,
        reason: InterruptReason,
    },

    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] TypeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl VersionError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VersionError::Initialization { .. } | VersionError::Config(_) => {
                ErrorKind::Initialization
            }
            VersionError::BranchNotFound { .. } | VersionError::VersionNotFound { .. } => {
                ErrorKind::NotFound
            }
            VersionError::BranchExists { .. } => ErrorKind::Conflict,
            VersionError::Mutation { .. } | VersionError::Git(_) => ErrorKind::Io,
            VersionError::UnreadableVersion { .. } => ErrorKind::Schema,
            VersionError::Interrupted { .. } => ErrorKind::Interrupted,
            VersionError::Lock(_) => ErrorKind::Lock,
            VersionError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether a requested version cannot be served, either because it does
    /// not exist or because its content cannot be decoded.
    pub fn is_version_unavailable(&self) -> bool {
        matches!(
            self,
            VersionError::VersionNotFound { .. } | VersionError::UnreadableVersion { .. }
        )
    }

    pub(crate) fn initialization(message: impl Into<String>, source: GitError) -> Self {
        VersionError::Initialization {
            message: message.into(),
            source: Some(source),
        }
    }
}
