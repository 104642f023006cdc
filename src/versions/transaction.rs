//! versions::transaction
//!
//! Worktree transaction: the write primitive behind every commit.
//!
//! # Architecture
//!
//! The repository has a single HEAD and worktree. To commit to an entity
//! branch, a transaction temporarily redirects HEAD there:
//!
//! 1. Record where HEAD points
//! 2. Attach HEAD to `refs/heads/<branch>`
//! 3. Orphan: clear worktree and index. Existing: force-checkout the tip
//! 4. Write `content.json`, stage it, commit
//! 5. Put HEAD back and force-checkout it
//!
//! Step 5 runs whether or not steps 2-4 succeeded, so between transactions
//! the worktree always shows the default branch.
//!
//! # Invariants
//!
//! - Callers hold the store's write mutex and [`RepoLock`] for the whole
//!   transaction
//! - Every commit tree contains exactly one file, `content.json`
//! - An orphan commit has no parent and requires the branch to be absent;
//!   an update commit has the read tip as its only parent and requires the
//!   branch to still point there
//!
//! [`RepoLock`]: crate::core::ops::RepoLock

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StageError, TxStage, VersionError};
use crate::core::naming::CONTENT_FILE;
use crate::core::ops::Interrupt;
use crate::core::types::{BranchName, Oid, RefName};
use crate::git::{Git, GitError, HeadPointer, Identity};

/// Which kind of commit a transaction produces.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TxMode {
    /// Root commit on a branch that does not exist yet.
    Orphan,
    /// Child of `tip` on an existing branch.
    Existing { tip: Oid },
}

/// A single commit to one entity branch.
#[derive(Debug)]
pub struct WorktreeTransaction<'a> {
    git: &'a Git,
    branch: &'a BranchName,
    refname: RefName,
    author: &'a Identity,
    interrupt: &'a Interrupt,
}

impl<'a> WorktreeTransaction<'a> {
    pub fn new(
        git: &'a Git,
        branch: &'a BranchName,
        author: &'a Identity,
        interrupt: &'a Interrupt,
    ) -> Self {
        Self {
            git,
            branch,
            refname: RefName::for_branch(branch),
            author,
            interrupt,
        }
    }

    /// Create the branch with a single root commit holding `snapshot`.
    pub fn create_orphan<S: Serialize>(
        &self,
        snapshot: &S,
        message: &str,
    ) -> Result<Oid, VersionError> {
        self.run(TxMode::Orphan, snapshot, message)
    }

    /// Append a commit holding `snapshot` on top of `tip`.
    pub fn update_existing<S: Serialize>(
        &self,
        tip: &Oid,
        snapshot: &S,
        message: &str,
    ) -> Result<Oid, VersionError> {
        self.run(TxMode::Existing { tip: tip.clone() }, snapshot, message)
    }

    fn run<S: Serialize>(
        &self,
        mode: TxMode,
        snapshot: &S,
        message: &str,
    ) -> Result<Oid, VersionError> {
        let saved = self
            .git
            .head_pointer()
            .map_err(|e| self.failure(TxStage::RedirectPointer, e.into()))?;
        debug!(branch = %self.branch, head = %saved, "recorded HEAD");

        let result = self.apply(&mode, snapshot, message);
        let restored = self.restore(&saved);

        match (result, restored) {
            (Ok(oid), Ok(())) => {
                debug!(branch = %self.branch, commit = %oid.short(7), "transaction committed");
                Ok(oid)
            }
            (Ok(oid), Err(e)) => {
                warn!(
                    branch = %self.branch,
                    commit = %oid.short(7),
                    error = %e,
                    "commit written but HEAD not restored"
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_err)) => {
                warn!(
                    branch = %self.branch,
                    error = %restore_err,
                    "HEAD not restored after failed transaction"
                );
                Err(e)
            }
        }
    }

    fn apply<S: Serialize>(
        &self,
        mode: &TxMode,
        snapshot: &S,
        message: &str,
    ) -> Result<Oid, VersionError> {
        self.step(TxStage::RedirectPointer, || {
            self.git.point_head_at(&self.refname)
        })?;

        match mode {
            TxMode::Orphan => {
                self.checkpoint(TxStage::ClearWorktree)?;
                let removed = self.step(TxStage::ClearWorktree, || self.git.clear_worktree())?;
                debug!(branch = %self.branch, removed = removed.len(), "cleared worktree");
            }
            TxMode::Existing { .. } => {
                self.checkpoint(TxStage::Checkout)?;
                self.step(TxStage::Checkout, || self.git.checkout_head_force())?;
            }
        }

        let bytes = self.step(TxStage::Serialize, || serde_json::to_vec_pretty(snapshot))?;
        let content = Path::new(CONTENT_FILE);
        let path = self.step(TxStage::WriteFile, || {
            self.git.write_worktree_file(content, &bytes)
        })?;
        debug!(branch = %self.branch, path = %path.display(), bytes = bytes.len(), "wrote content");
        self.step(TxStage::StageFile, || self.git.stage_path(content))?;

        self.checkpoint(TxStage::Commit)?;
        let parents = match mode {
            TxMode::Orphan => Vec::new(),
            TxMode::Existing { tip } => vec![tip.clone()],
        };
        self.step(TxStage::Commit, || {
            self.git
                .commit_index(&self.refname, message, self.author, &parents)
        })
    }

    fn restore(&self, saved: &HeadPointer) -> Result<(), VersionError> {
        self.step(TxStage::RestorePointer, || -> Result<(), GitError> {
            self.git.set_head_pointer(saved)?;
            self.git.checkout_head_force()
        })?;
        debug!(branch = %self.branch, head = %saved, "restored HEAD");
        Ok(())
    }

    /// Run one stage, tagging any failure with the stage and branch.
    fn step<T, E>(&self, stage: TxStage, op: impl FnOnce() -> Result<T, E>) -> Result<T, VersionError>
    where
        E: Into<StageError>,
    {
        #[cfg(any(test, feature = "fault_injection"))]
        if fault_injection::should_fail(stage) {
            return Err(self.failure(stage, StageError::Injected));
        }

        op().map_err(|e| self.failure(stage, e.into()))
    }

    fn failure(&self, stage: TxStage, source: StageError) -> VersionError {
        VersionError::Mutation {
            stage,
            branch: self.branch.clone(),
            source,
        }
    }

    /// Stop before `stage` if the interrupt has tripped.
    fn checkpoint(&self, stage: TxStage) -> Result<(), VersionError> {
        self.interrupt.check().map_err(|reason| {
            debug!(branch = %self.branch, stage = %stage, %reason, "transaction interrupted");
            VersionError::Interrupted {
                stage,
                branch: self.branch.clone(),
                reason,
            }
        })
    }
}

/// Fault injection for transaction stages.
///
/// Only available in test builds or with the `fault_injection` feature.
/// Lets tests fail a chosen stage to prove HEAD is restored afterwards.
///
/// # Example
///
/// ```ignore
/// use proompt_versions::versions::transaction::fault_injection;
/// use proompt_versions::versions::TxStage;
///
/// fault_injection::fail_at(TxStage::Commit);
/// let result = store.update_branch(&prompt, "", &Interrupt::none());
/// assert!(result.is_err());
///
/// fault_injection::reset();
/// ```
#[cfg(any(test, feature = "fault_injection"))]
pub mod fault_injection {
    use std::cell::Cell;

    use crate::versions::TxStage;

    // Thread-local so parallel test threads do not see each other's faults.
    thread_local! {
        static FAIL_AT: Cell<Option<TxStage>> = const { Cell::new(None) };
        static HITS: Cell<usize> = const { Cell::new(0) };
    }

    /// Fail the next transaction step at `stage` (one-shot).
    pub fn fail_at(stage: TxStage) {
        FAIL_AT.with(|c| c.set(Some(stage)));
    }

    /// Check whether `stage` should fail now, consuming the fault if so.
    pub fn should_fail(stage: TxStage) -> bool {
        FAIL_AT.with(|c| {
            if c.get() == Some(stage) {
                c.set(None);
                HITS.with(|h| h.set(h.get() + 1));
                true
            } else {
                false
            }
        })
    }

    /// Clear any pending fault and the hit counter.
    pub fn reset() {
        FAIL_AT.with(|c| c.set(None));
        HITS.with(|h| h.set(0));
    }

    /// Number of faults that fired since the last reset.
    pub fn hits() -> usize {
        HITS.with(|h| h.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ops::InterruptReason;
    use crate::versions::{StoreSettings, VersionStore};
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    #[derive(Serialize)]
    struct Doc {
        text: &'static str,
    }

    fn setup() -> (TempDir, VersionStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(StoreSettings::new(temp.path())).unwrap();
        (temp, store)
    }

    fn main_pointer() -> HeadPointer {
        HeadPointer::Symbolic(RefName::new("refs/heads/main").unwrap())
    }

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    fn assert_head_restored(store: &VersionStore, git: &Git) {
        assert_eq!(git.head_pointer().unwrap(), main_pointer());
        assert!(store.paths().marker_path().exists());
        assert!(!store.paths().content_path().exists());
    }

    mod orphan {
        use super::*;

        #[test]
        fn creates_root_commit_and_restores_head() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);

            let oid = tx.create_orphan(&Doc { text: "hi" }, "Create: P1").unwrap();

            let info = git.commit_info(&oid).unwrap();
            assert!(info.parents.is_empty());
            assert_eq!(info.message, "Create: P1");
            assert_eq!(git.tree_entry_names(&oid).unwrap(), vec![CONTENT_FILE]);
            let stored = git.read_file_at(&oid, Path::new(CONTENT_FILE)).unwrap();
            assert_eq!(stored, b"{\n  \"text\": \"hi\"\n}");
            assert_head_restored(&store, &git);
        }

        #[test]
        fn clears_untracked_leftovers() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            std::fs::create_dir_all(store.paths().repo_dir().join("stray/dir")).unwrap();
            std::fs::write(store.paths().repo_dir().join("stray/dir/x.txt"), "x").unwrap();

            let author = store.settings().author.clone();
            let b = branch("snippets/s1");
            let interrupt = Interrupt::none();
            let oid = WorktreeTransaction::new(&git, &b, &author, &interrupt)
                .create_orphan(&Doc { text: "s" }, "Create: S")
                .unwrap();

            assert_eq!(git.tree_entry_names(&oid).unwrap(), vec![CONTENT_FILE]);
        }

        #[test]
        fn existing_branch_is_rejected_by_commit() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);
            tx.create_orphan(&Doc { text: "1" }, "Create: A").unwrap();

            let err = tx.create_orphan(&Doc { text: "2" }, "Create: B").unwrap_err();
            assert!(matches!(
                err,
                VersionError::Mutation {
                    stage: TxStage::Commit,
                    ..
                }
            ));
            assert_head_restored(&store, &git);
        }
    }

    mod existing {
        use super::*;

        #[test]
        fn appends_child_of_tip() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);

            let root = tx.create_orphan(&Doc { text: "1" }, "Create: A").unwrap();
            let child = tx
                .update_existing(&root, &Doc { text: "2" }, "Update: A")
                .unwrap();

            assert_eq!(git.commit_info(&child).unwrap().parents, vec![root]);
            assert_eq!(git.tree_entry_names(&child).unwrap(), vec![CONTENT_FILE]);
            assert_head_restored(&store, &git);
        }

        #[test]
        fn stale_tip_is_rejected() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);

            let root = tx.create_orphan(&Doc { text: "1" }, "Create: A").unwrap();
            tx.update_existing(&root, &Doc { text: "2" }, "Update: A")
                .unwrap();

            let err = tx
                .update_existing(&root, &Doc { text: "3" }, "Update: A")
                .unwrap_err();
            assert!(matches!(
                err,
                VersionError::Mutation {
                    stage: TxStage::Commit,
                    ..
                }
            ));
        }
    }

    mod faults {
        use super::*;

        #[test]
        fn every_write_stage_restores_head() {
            for stage in [
                TxStage::RedirectPointer,
                TxStage::ClearWorktree,
                TxStage::Serialize,
                TxStage::WriteFile,
                TxStage::StageFile,
                TxStage::Commit,
            ] {
                let (_temp, store) = setup();
                let git = store.git().unwrap();
                let author = store.settings().author.clone();
                let b = branch("prompts/p1");
                let interrupt = Interrupt::none();
                let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);

                fault_injection::reset();
                fault_injection::fail_at(stage);
                let err = tx.create_orphan(&Doc { text: "x" }, "Create: X").unwrap_err();
                fault_injection::reset();

                match err {
                    VersionError::Mutation { stage: failed, .. } => assert_eq!(failed, stage),
                    other => panic!("unexpected error for {stage}: {other}"),
                }
                assert!(!git.ref_exists("refs/heads/prompts/p1"), "{stage}");
                assert_head_restored(&store, &git);
            }
        }

        #[test]
        fn checkout_failure_on_update_restores_head() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);
            let root = tx.create_orphan(&Doc { text: "1" }, "Create: A").unwrap();

            fault_injection::fail_at(TxStage::Checkout);
            let err = tx
                .update_existing(&root, &Doc { text: "2" }, "Update: A")
                .unwrap_err();
            fault_injection::reset();

            assert!(matches!(
                err,
                VersionError::Mutation {
                    stage: TxStage::Checkout,
                    ..
                }
            ));
            assert_eq!(git.resolve_ref("refs/heads/prompts/p1").unwrap(), root);
            assert_head_restored(&store, &git);
        }

        #[test]
        fn restore_failure_is_reported() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let interrupt = Interrupt::none();
            let tx = WorktreeTransaction::new(&git, &b, &author, &interrupt);

            fault_injection::fail_at(TxStage::RestorePointer);
            let err = tx.create_orphan(&Doc { text: "x" }, "Create: X").unwrap_err();
            assert_eq!(fault_injection::hits(), 1);
            fault_injection::reset();

            assert!(matches!(
                err,
                VersionError::Mutation {
                    stage: TxStage::RestorePointer,
                    ..
                }
            ));
            // The commit itself landed
            assert!(git.ref_exists("refs/heads/prompts/p1"));
        }
    }

    mod interrupts {
        use super::*;

        #[test]
        fn cancelled_before_clear() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let token = CancellationToken::new();
            token.cancel();
            let interrupt = Interrupt::none().with_token(token);

            let err = WorktreeTransaction::new(&git, &b, &author, &interrupt)
                .create_orphan(&Doc { text: "x" }, "Create: X")
                .unwrap_err();

            assert!(matches!(
                err,
                VersionError::Interrupted {
                    stage: TxStage::ClearWorktree,
                    reason: InterruptReason::Cancelled,
                    ..
                }
            ));
            assert!(!git.ref_exists("refs/heads/prompts/p1"));
            assert_head_restored(&store, &git);
        }

        #[test]
        fn expired_deadline_before_checkout() {
            let (_temp, store) = setup();
            let git = store.git().unwrap();
            let author = store.settings().author.clone();
            let b = branch("prompts/p1");
            let none = Interrupt::none();
            let root = WorktreeTransaction::new(&git, &b, &author, &none)
                .create_orphan(&Doc { text: "1" }, "Create: A")
                .unwrap();

            let expired = Interrupt::none().with_deadline(std::time::Instant::now());
            let err = WorktreeTransaction::new(&git, &b, &author, &expired)
                .update_existing(&root, &Doc { text: "2" }, "Update: A")
                .unwrap_err();

            assert!(matches!(
                err,
                VersionError::Interrupted {
                    stage: TxStage::Checkout,
                    reason: InterruptReason::DeadlineExceeded,
                    ..
                }
            ));
            assert_eq!(git.resolve_ref("refs/heads/prompts/p1").unwrap(), root);
            assert_head_restored(&store, &git);
        }
    }
}
