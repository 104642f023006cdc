//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module should import `git2`, and
//! nothing shells out to the git CLI.
//!
//! # Responsibilities
//!
//! - Repository initialization and opening
//! - HEAD pointer reads and redirects
//! - Worktree clearing, forced checkout, staging
//! - Commit creation with an atomic ref precondition
//! - Ref resolution, enumeration and CAS delete
//! - History walks and reading files out of commit trees
//!
//! # Invariants
//!
//! - Commit creation updates its ref only if the ref still matches the
//!   first parent (or is absent for a root commit)
//! - All operations return strong types (Oid, BranchName, RefName)

mod interface;

pub use interface::{CommitInfo, Git, GitError, HeadPointer, Identity, RefEntry};
