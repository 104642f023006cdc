//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in the
//! version store. Every repository read and write flows through [`Git`],
//! which returns strong types and normalizes errors into typed failure
//! categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: No repository at the given path
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::ObjectNotFound`]: Requested commit or blob does not exist
//! - [`GitError::PathNotFound`]: A commit's tree lacks the requested file
//! - [`GitError::CasFailed`]: Compare-and-swap precondition failed
//!
//! # Example
//!
//! ```
//! use proompt_versions::core::types::BranchName;
//! use proompt_versions::git::Git;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let git = Git::init(temp.path(), &BranchName::new("main").unwrap()).unwrap();
//!
//! // A fresh repository has no refs; HEAD is an unborn `main`
//! assert!(!git.has_any_refs().unwrap());
//! assert!(git.try_resolve_ref("refs/heads/main").unwrap().is_none());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::naming::split_message;
use crate::core::types::{BranchName, Oid, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository at the given path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Compare-and-swap precondition failed.
    ///
    /// The ref moved between the read and the write.
    #[error("CAS failed for {refname}: expected {expected}, found {actual}")]
    CasFailed {
        /// The ref being updated
        refname: String,
        /// The expected old value
        expected: String,
        /// The actual current value
        actual: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// A commit's tree has no entry at the requested path.
    #[error("{path} not found in commit {commit}")]
    PathNotFound {
        /// The missing path
        path: String,
        /// The commit that was searched
        commit: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Modified => GitError::CasFailed {
                refname: context.to_string(),
                expected: "first parent".to_string(),
                actual: err.message().to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn internal(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }

    fn io(err: std::io::Error, path: &Path) -> Self {
        GitError::AccessError {
            message: format!("{}: {}", path.display(), err),
        }
    }

    /// Whether the error means "the thing asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitError::RefNotFound { .. }
                | GitError::ObjectNotFound { .. }
                | GitError::PathNotFound { .. }
        )
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) | TypeError::InvalidBranchName(msg) => {
                GitError::InvalidRefName { message: msg }
            }
            other => GitError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Where HEAD points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadPointer {
    /// Attached to a branch ref (which may be unborn).
    Symbolic(RefName),
    /// Detached at a commit.
    Detached(Oid),
}

impl std::fmt::Display for HeadPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadPointer::Symbolic(name) => write!(f, "{}", name),
            HeadPointer::Detached(oid) => write!(f, "detached at {}", oid.short(7)),
        }
    }
}

/// Commit author and committer identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A ref with its name and target OID.
#[derive(Debug, Clone)]
pub struct RefEntry {
    /// The full ref name
    pub name: RefName,
    /// The OID the ref points to
    pub oid: Oid,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Message text after the first blank line (may be empty)
    pub body: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
    /// Parent commits, in order
    pub parents: Vec<Oid>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`.
///
/// A `Git` owns one `git2::Repository` handle. Handles are cheap to open and
/// not shared between threads; callers open one per operation.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open the repository whose working directory is exactly `path`.
    ///
    /// Unlike discovery, parent directories are never searched, so a store
    /// nested inside another checkout cannot open the outer repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Initialize a non-bare repository at `path` with HEAD on `initial_head`.
    ///
    /// Missing parent directories are created.
    pub fn init(path: &Path, initial_head: &BranchName) -> Result<Self, GitError> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.bare(false)
            .mkpath(true)
            .no_reinit(false)
            .initial_head(initial_head.as_str());

        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;

        Ok(Self { repo })
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Whether the repository holds any reference at all.
    pub fn has_any_refs(&self) -> Result<bool, GitError> {
        let mut refs = self.repo.references().map_err(GitError::internal)?;
        Ok(refs.next().is_some())
    }

    // =========================================================================
    // HEAD Pointer
    // =========================================================================

    /// Read where HEAD points without resolving it.
    ///
    /// Works on an unborn HEAD, which is reported as `Symbolic`.
    pub fn head_pointer(&self) -> Result<HeadPointer, GitError> {
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        if let Some(target) = head.symbolic_target() {
            return Ok(HeadPointer::Symbolic(RefName::new(target)?));
        }

        let oid = head.target().ok_or_else(|| GitError::Internal {
            message: "HEAD has neither a symbolic nor a direct target".to_string(),
        })?;
        Ok(HeadPointer::Detached(Oid::new(oid.to_string())?))
    }

    /// Attach HEAD to `refname`.
    ///
    /// The ref need not exist; HEAD then becomes unborn and the next commit
    /// is a root commit.
    pub fn point_head_at(&self, refname: &RefName) -> Result<(), GitError> {
        self.repo
            .set_head(refname.as_str())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))
    }

    /// Put HEAD back to a previously read pointer.
    pub fn set_head_pointer(&self, pointer: &HeadPointer) -> Result<(), GitError> {
        match pointer {
            HeadPointer::Symbolic(name) => self.point_head_at(name),
            HeadPointer::Detached(oid) => {
                let git_oid = to_git2_oid(oid)?;
                self.repo
                    .set_head_detached(git_oid)
                    .map_err(|e| GitError::from_git2(e, oid.as_str()))
            }
        }
    }

    // =========================================================================
    // Working Tree and Index
    // =========================================================================

    /// Remove every tracked, staged and untracked file from the worktree and
    /// empty the index.
    ///
    /// Returns the paths that were removed from disk.
    pub fn clear_worktree(&self) -> Result<Vec<PathBuf>, GitError> {
        let work_dir = self.work_dir()?.to_path_buf();

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(GitError::internal)?;

        let mut removed = Vec::new();
        for entry in statuses.iter() {
            let Some(rel) = entry.path() else {
                continue; // non-UTF8 path
            };
            let full = work_dir.join(rel);
            match std::fs::symlink_metadata(&full) {
                Ok(meta) if meta.is_dir() => {
                    std::fs::remove_dir_all(&full).map_err(|e| GitError::io(e, &full))?;
                }
                Ok(_) => {
                    std::fs::remove_file(&full).map_err(|e| GitError::io(e, &full))?;
                }
                // Staged but already deleted from disk
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(GitError::io(e, &full)),
            }
            removed.push(PathBuf::from(rel));
        }

        let mut index = self.repo.index().map_err(GitError::internal)?;
        index.clear().map_err(GitError::internal)?;
        index.write().map_err(GitError::internal)?;

        Ok(removed)
    }

    /// Force-checkout HEAD, discarding local changes and untracked files.
    pub fn checkout_head_force(&self) -> Result<(), GitError> {
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.force().remove_untracked(true);
        self.repo
            .checkout_head(Some(&mut builder))
            .map_err(|e| GitError::from_git2(e, "HEAD"))
    }

    /// Write a file relative to the working directory.
    pub fn write_worktree_file(&self, rel: &Path, contents: &[u8]) -> Result<PathBuf, GitError> {
        let full = self.work_dir()?.join(rel);
        std::fs::write(&full, contents).map_err(|e| GitError::io(e, &full))?;
        Ok(full)
    }

    /// Stage a worktree file in the index.
    pub fn stage_path(&self, rel: &Path) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::internal)?;
        index
            .add_path(rel)
            .map_err(|e| GitError::from_git2(e, &rel.display().to_string()))?;
        index.write().map_err(GitError::internal)
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Commit the current index to `refname`.
    ///
    /// `parents` empty creates a root commit and requires that `refname` does
    /// not exist yet. Otherwise the ref must currently point at `parents[0]`.
    /// Both checks happen atomically inside libgit2.
    ///
    /// # Errors
    ///
    /// - [`GitError::CasFailed`] if the ref moved
    pub fn commit_index(
        &self,
        refname: &RefName,
        message: &str,
        identity: &Identity,
        parents: &[Oid],
    ) -> Result<Oid, GitError> {
        let mut index = self.repo.index().map_err(GitError::internal)?;
        let tree_oid = index.write_tree().map_err(GitError::internal)?;
        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(|e| GitError::from_git2(e, &tree_oid.to_string()))?;

        let signature = git2::Signature::now(&identity.name, &identity.email)
            .map_err(GitError::internal)?;

        let mut parent_commits = Vec::with_capacity(parents.len());
        for parent in parents {
            let commit = self
                .repo
                .find_commit(to_git2_oid(parent)?)
                .map_err(|e| GitError::from_git2(e, parent.as_str()))?;
            parent_commits.push(commit);
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        let oid = self
            .repo
            .commit(
                Some(refname.as_str()),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

        Ok(Oid::new(oid.to_string())?)
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref to its target commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn resolve_ref(&self, refname: &str) -> Result<Oid, GitError> {
        let reference = self
            .repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let oid = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname))?
            .id();

        Oid::new(oid.to_string()).map_err(|e| e.into())
    }

    /// Resolve a ref, returning None if it doesn't exist.
    pub fn try_resolve_ref(&self, refname: &str) -> Result<Option<Oid>, GitError> {
        match self.resolve_ref(refname) {
            Ok(oid) => Ok(Some(oid)),
            Err(GitError::RefNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Oid::new(oid.to_string()).map_err(|e| e.into())
    }

    /// Check if a ref exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// List all refs matching a prefix.
    pub fn list_refs_by_prefix(&self, prefix: &str) -> Result<Vec<RefEntry>, GitError> {
        let pattern = format!("{}*", prefix);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(GitError::internal)?;

        let mut entries = Vec::new();
        for reference in refs {
            let reference = reference.map_err(GitError::internal)?;

            let Some(name) = reference.name() else {
                continue; // non-UTF8 name
            };
            let Ok(ref_name) = RefName::new(name) else {
                continue;
            };
            let Ok(commit) = reference.peel_to_commit() else {
                continue;
            };
            let Ok(oid) = Oid::new(commit.id().to_string()) else {
                continue;
            };

            entries.push(RefEntry {
                name: ref_name,
                oid,
            });
        }

        entries.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(entries)
    }

    /// Delete a ref with compare-and-swap semantics.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    /// - [`GitError::CasFailed`] if the current value doesn't match expected
    pub fn delete_ref_cas(&self, refname: &str, expected_old: &Oid) -> Result<(), GitError> {
        let mut reference = self
            .repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let actual = reference
            .target()
            .map(|oid| oid.to_string())
            .unwrap_or_else(|| "<symbolic>".to_string());
        if actual != expected_old.as_str() {
            return Err(GitError::CasFailed {
                refname: refname.to_string(),
                expected: expected_old.to_string(),
                actual,
            });
        }

        reference
            .delete()
            .map_err(|e| GitError::from_git2(e, refname))
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;
        Self::describe(&commit)
    }

    /// Walk from `tip` to the root, newest first.
    pub fn log(&self, tip: &Oid) -> Result<Vec<CommitInfo>, GitError> {
        let mut revwalk = self.repo.revwalk().map_err(GitError::internal)?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL)
            .map_err(GitError::internal)?;
        revwalk
            .push(to_git2_oid(tip)?)
            .map_err(|e| GitError::from_git2(e, tip.as_str()))?;

        let mut entries = Vec::new();
        for step in revwalk {
            let id = step.map_err(GitError::internal)?;
            let commit = self
                .repo
                .find_commit(id)
                .map_err(|e| GitError::from_git2(e, &id.to_string()))?;
            entries.push(Self::describe(&commit)?);
        }

        Ok(entries)
    }

    fn describe(commit: &git2::Commit<'_>) -> Result<CommitInfo, GitError> {
        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        let (summary, body) = split_message(&message);
        let (summary, body) = (summary.to_string(), body.to_string());

        let mut parents = Vec::with_capacity(commit.parent_count());
        for id in commit.parent_ids() {
            parents.push(Oid::new(id.to_string())?);
        }

        Ok(CommitInfo {
            oid: Oid::new(commit.id().to_string())?,
            summary,
            body,
            message,
            author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
            author_time,
            parents,
        })
    }

    /// Names of the top-level entries in a commit's tree.
    pub fn tree_entry_names(&self, oid: &Oid) -> Result<Vec<String>, GitError> {
        let commit = self.find_commit(oid)?;
        let tree = commit.tree().map_err(GitError::internal)?;
        Ok(tree
            .iter()
            .map(|entry| String::from_utf8_lossy(entry.name_bytes()).into_owned())
            .collect())
    }

    /// Read a file from a commit's tree, bypassing HEAD and the worktree.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    /// - [`GitError::PathNotFound`] if the tree has no blob at `path`
    pub fn read_file_at(&self, oid: &Oid, path: &Path) -> Result<Vec<u8>, GitError> {
        let commit = self.find_commit(oid)?;
        let tree = commit.tree().map_err(GitError::internal)?;

        let not_found = || GitError::PathNotFound {
            path: path.display().to_string(),
            commit: oid.to_string(),
        };

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Err(not_found()),
            Err(e) => return Err(GitError::internal(e)),
        };
        let object = entry.to_object(&self.repo).map_err(GitError::internal)?;
        let blob = object.into_blob().map_err(|_| not_found())?;

        Ok(blob.content().to_vec())
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .find_commit(to_git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

fn to_git2_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> Identity {
        Identity::new("Tester", "tester@local")
    }

    fn main_branch() -> BranchName {
        BranchName::new("main").unwrap()
    }

    fn init_repo() -> (TempDir, Git) {
        let temp = TempDir::new().unwrap();
        let git = Git::init(&temp.path().join("repo"), &main_branch()).unwrap();
        (temp, git)
    }

    fn commit_file(git: &Git, refname: &RefName, name: &str, body: &str, parents: &[Oid]) -> Oid {
        git.write_worktree_file(Path::new(name), body.as_bytes())
            .unwrap();
        git.stage_path(Path::new(name)).unwrap();
        git.commit_index(refname, &format!("write {name}"), &identity(), parents)
            .unwrap()
    }

    mod git_error {
        use super::*;

        #[test]
        fn not_found_classification() {
            assert!(GitError::RefNotFound {
                refname: "refs/heads/x".into()
            }
            .is_not_found());
            assert!(GitError::PathNotFound {
                path: "content.json".into(),
                commit: "abc".into()
            }
            .is_not_found());
            assert!(!GitError::Internal {
                message: "boom".into()
            }
            .is_not_found());
        }

        #[test]
        fn display_formatting() {
            let err = GitError::CasFailed {
                refname: "refs/heads/main".to_string(),
                expected: "abc".to_string(),
                actual: "def".to_string(),
            };
            assert!(err.to_string().contains("CAS failed"));
            assert!(err.to_string().contains("refs/heads/main"));
        }

        #[test]
        fn type_error_conversion() {
            let err: GitError = TypeError::InvalidOid("zz".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod repository {
        use super::*;

        #[test]
        fn open_missing_is_not_a_repo() {
            let temp = TempDir::new().unwrap();
            let result = Git::open(temp.path());
            assert!(matches!(result, Err(GitError::NotARepo { .. })));
        }

        #[test]
        fn init_then_open() {
            let (temp, _git) = init_repo();
            let git = Git::open(&temp.path().join("repo")).unwrap();
            assert!(git.git_dir().ends_with(".git/"));
            assert!(git.work_dir().unwrap().ends_with("repo/"));
        }

        #[test]
        fn fresh_head_is_unborn_main() {
            let (_temp, git) = init_repo();
            assert_eq!(
                git.head_pointer().unwrap(),
                HeadPointer::Symbolic(RefName::new("refs/heads/main").unwrap())
            );
            assert!(matches!(git.head_oid(), Err(GitError::RefNotFound { .. })));
        }
    }

    mod commits {
        use super::*;

        #[test]
        fn root_then_child() {
            let (_temp, git) = init_repo();
            let main = RefName::new("refs/heads/main").unwrap();

            let root = commit_file(&git, &main, "a.txt", "one", &[]);
            let child = commit_file(&git, &main, "a.txt", "two", &[root.clone()]);

            assert_eq!(git.resolve_ref("refs/heads/main").unwrap(), child);
            let info = git.commit_info(&child).unwrap();
            assert_eq!(info.parents, vec![root.clone()]);
            assert_eq!(info.summary, "write a.txt");
            assert_eq!(info.author_name, "Tester");

            let log = git.log(&child).unwrap();
            let oids: Vec<_> = log.iter().map(|c| c.oid.clone()).collect();
            assert_eq!(oids, vec![child, root]);
        }

        #[test]
        fn root_commit_refuses_existing_ref() {
            let (_temp, git) = init_repo();
            let main = RefName::new("refs/heads/main").unwrap();
            commit_file(&git, &main, "a.txt", "one", &[]);

            let result = git.commit_index(&main, "again", &identity(), &[]);
            assert!(matches!(result, Err(GitError::CasFailed { .. })));
        }

        #[test]
        fn read_file_at_commit() {
            let (_temp, git) = init_repo();
            let main = RefName::new("refs/heads/main").unwrap();
            let oid = commit_file(&git, &main, "a.txt", "hello", &[]);

            assert_eq!(git.read_file_at(&oid, Path::new("a.txt")).unwrap(), b"hello");
            assert!(matches!(
                git.read_file_at(&oid, Path::new("missing.txt")),
                Err(GitError::PathNotFound { .. })
            ));
            assert_eq!(git.tree_entry_names(&oid).unwrap(), vec!["a.txt"]);
        }

        #[test]
        fn unknown_commit_is_object_not_found() {
            let (_temp, git) = init_repo();
            let missing = Oid::new("0123456789abcdef0123456789abcdef01234567").unwrap();
            assert!(matches!(
                git.commit_info(&missing),
                Err(GitError::ObjectNotFound { .. })
            ));
        }
    }

    mod head_and_worktree {
        use super::*;

        #[test]
        fn redirect_clear_and_restore() {
            let (_temp, git) = init_repo();
            let main = RefName::new("refs/heads/main").unwrap();
            commit_file(&git, &main, "README.md", "marker", &[]);

            let saved = git.head_pointer().unwrap();
            let orphan = RefName::new("refs/heads/prompts/p1").unwrap();
            git.point_head_at(&orphan).unwrap();

            let removed = git.clear_worktree().unwrap();
            assert_eq!(removed, vec![PathBuf::from("README.md")]);
            assert!(!git.work_dir().unwrap().join("README.md").exists());

            let root = commit_file(&git, &orphan, "content.json", "{}", &[]);
            assert_eq!(git.tree_entry_names(&root).unwrap(), vec!["content.json"]);
            assert!(git.commit_info(&root).unwrap().parents.is_empty());

            git.set_head_pointer(&saved).unwrap();
            git.checkout_head_force().unwrap();
            assert!(git.work_dir().unwrap().join("README.md").exists());
            assert!(!git.work_dir().unwrap().join("content.json").exists());
        }

        #[test]
        fn detached_pointer_roundtrip() {
            let (_temp, git) = init_repo();
            let main = RefName::new("refs/heads/main").unwrap();
            let oid = commit_file(&git, &main, "a.txt", "x", &[]);

            git.set_head_pointer(&HeadPointer::Detached(oid.clone()))
                .unwrap();
            assert_eq!(git.head_pointer().unwrap(), HeadPointer::Detached(oid));
        }
    }

    mod refs {
        use super::*;

        #[test]
        fn list_and_delete() {
            let (_temp, git) = init_repo();
            let a = RefName::new("refs/heads/prompts/a").unwrap();
            let b = RefName::new("refs/heads/prompts/b").unwrap();
            let oid_a = commit_file(&git, &a, "content.json", "a", &[]);
            commit_file(&git, &b, "content.json", "b", &[]);

            let names: Vec<_> = git
                .list_refs_by_prefix("refs/heads/prompts/")
                .unwrap()
                .into_iter()
                .map(|e| e.name.to_string())
                .collect();
            assert_eq!(names, vec!["refs/heads/prompts/a", "refs/heads/prompts/b"]);

            git.delete_ref_cas(a.as_str(), &oid_a).unwrap();
            assert!(!git.ref_exists(a.as_str()));
            assert!(matches!(
                git.delete_ref_cas(a.as_str(), &oid_a),
                Err(GitError::RefNotFound { .. })
            ));
        }

        #[test]
        fn delete_cas_mismatch() {
            let (_temp, git) = init_repo();
            let a = RefName::new("refs/heads/prompts/a").unwrap();
            let root = commit_file(&git, &a, "content.json", "1", &[]);
            commit_file(&git, &a, "content.json", "2", &[root.clone()]);

            let result = git.delete_ref_cas(a.as_str(), &root);
            assert!(matches!(result, Err(GitError::CasFailed { .. })));
            assert!(git.ref_exists(a.as_str()));
        }
    }
}
