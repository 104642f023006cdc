//! versions::lifecycle
//!
//! Branch lifecycle: create, update and delete per entity.
//!
//! # Architecture
//!
//! The CRUD layer calls these around its own datastore writes. Each
//! mutation:
//! 1. Derives the branch from `(kind, id)`; names are never caller supplied
//! 2. Takes the in-process write mutex, then the repository lock
//! 3. Checks the branch precondition (absent for create, present otherwise)
//! 4. Runs a [`WorktreeTransaction`] (create/update) or a CAS ref delete
//!
//! Both locks are held until the operation returns, HEAD restore included.

use std::sync::MutexGuard;

use tracing::{debug, info};

use super::error::{StageError, TxStage, VersionError};
use super::transaction::WorktreeTransaction;
use super::VersionStore;
use crate::core::entity::VersionedEntity;
use crate::core::naming::{commit_message, entity_branch, entity_ref, kind_ref_prefix, MessageAction};
use crate::core::ops::{Interrupt, RepoLock};
use crate::core::types::{EntityId, EntityKind, Oid};
use crate::git::HeadPointer;

/// Both write locks, released together on drop.
struct WriteGuard<'a> {
    _repo: RepoLock,
    _local: MutexGuard<'a, ()>,
}

impl VersionStore {
    /// Serialize against other writers in this process and in others.
    fn lock_writes(&self) -> Result<WriteGuard<'_>, VersionError> {
        // The mutex guards no data, so a panicked holder leaves nothing torn
        let local = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let repo = if self.settings.wait_for_lock {
            RepoLock::acquire_blocking(&self.paths)?
        } else {
            RepoLock::acquire(&self.paths)?
        };
        Ok(WriteGuard {
            _repo: repo,
            _local: local,
        })
    }

    /// Record the first version of an entity on a new orphan branch.
    ///
    /// The commit message is `Create: <title>`, followed by a blank line and
    /// `annotation` when it is non-empty.
    ///
    /// # Errors
    ///
    /// - [`VersionError::InvalidInput`] if the entity cannot be stored
    /// - [`VersionError::BranchExists`] if the entity already has a branch
    /// - [`VersionError::Lock`] if another writer holds the lock and the
    ///   store does not wait
    /// - [`VersionError::Mutation`] if a transaction stage fails
    /// - [`VersionError::Interrupted`] if `interrupt` trips
    pub fn create_branch<E: VersionedEntity>(
        &self,
        entity: &E,
        annotation: &str,
        interrupt: &Interrupt,
    ) -> Result<Oid, VersionError> {
        let branch = entity_branch(E::KIND, entity.id());
        let refname = entity_ref(E::KIND, entity.id());
        let message = commit_message(MessageAction::Create, entity.title(), annotation);
        entity.validate()?;

        let _guard = self.lock_writes()?;
        let git = self.git()?;

        if git.ref_exists(refname.as_str()) {
            return Err(VersionError::BranchExists { branch });
        }

        let snapshot = entity.snapshot();
        let oid = WorktreeTransaction::new(&git, &branch, &self.settings.author, interrupt)
            .create_orphan(&snapshot, &message)?;

        info!(branch = %branch, title = entity.title(), commit = %oid.short(7), "created branch");
        Ok(oid)
    }

    /// Record a new version of an entity on its existing branch.
    ///
    /// The commit message is `Update: <title>`, plus the annotation body.
    ///
    /// # Errors
    ///
    /// - [`VersionError::InvalidInput`] if the entity cannot be stored
    /// - [`VersionError::BranchNotFound`] if the entity has no branch
    /// - [`VersionError::Mutation`] if a transaction stage fails
    /// - [`VersionError::Interrupted`] if `interrupt` trips
    pub fn update_branch<E: VersionedEntity>(
        &self,
        entity: &E,
        annotation: &str,
        interrupt: &Interrupt,
    ) -> Result<Oid, VersionError> {
        let branch = entity_branch(E::KIND, entity.id());
        let refname = entity_ref(E::KIND, entity.id());
        let message = commit_message(MessageAction::Update, entity.title(), annotation);
        entity.validate()?;

        let _guard = self.lock_writes()?;
        let git = self.git()?;

        let tip = git
            .try_resolve_ref(refname.as_str())?
            .ok_or_else(|| VersionError::BranchNotFound {
                branch: branch.clone(),
            })?;

        let snapshot = entity.snapshot();
        let oid = WorktreeTransaction::new(&git, &branch, &self.settings.author, interrupt)
            .update_existing(&tip, &snapshot, &message)?;

        info!(branch = %branch, title = entity.title(), commit = %oid.short(7), "updated branch");
        Ok(oid)
    }

    /// Remove an entity's branch. Its commits stay in the object database.
    ///
    /// If HEAD is attached to the branch, it is first moved to the default
    /// branch.
    ///
    /// # Errors
    ///
    /// - [`VersionError::BranchNotFound`] if the entity has no branch
    /// - [`VersionError::Mutation`] if HEAD cannot be moved or the ref
    ///   cannot be removed
    pub fn delete_branch(&self, kind: EntityKind, id: &EntityId) -> Result<(), VersionError> {
        let branch = entity_branch(kind, id);
        let refname = entity_ref(kind, id);

        let _guard = self.lock_writes()?;
        let git = self.git()?;

        let tip = git
            .try_resolve_ref(refname.as_str())?
            .ok_or_else(|| VersionError::BranchNotFound {
                branch: branch.clone(),
            })?;

        let failure = |stage: TxStage, source: StageError| VersionError::Mutation {
            stage,
            branch: branch.clone(),
            source,
        };

        if git.head_pointer()? == HeadPointer::Symbolic(refname.clone()) {
            debug!(branch = %branch, "moving HEAD off branch before delete");
            git.set_head_pointer(&HeadPointer::Symbolic(self.default_ref()))
                .and_then(|()| git.checkout_head_force())
                .map_err(|e| failure(TxStage::RestorePointer, e.into()))?;
        }

        git.delete_ref_cas(refname.as_str(), &tip)
            .map_err(|e| failure(TxStage::DeleteRef, e.into()))?;

        info!(branch = %branch, tip = %tip.short(7), "deleted branch");
        Ok(())
    }

    /// Whether the entity has a branch.
    pub fn branch_exists(&self, kind: EntityKind, id: &EntityId) -> Result<bool, VersionError> {
        let git = self.git()?;
        Ok(git.ref_exists(entity_ref(kind, id).as_str()))
    }

    /// Ids of every entity of `kind` that has a branch, sorted.
    ///
    /// Refs under the kind's namespace that are not a valid entity id are
    /// skipped.
    pub fn list_entities(&self, kind: EntityKind) -> Result<Vec<EntityId>, VersionError> {
        let git = self.git()?;
        let prefix = kind_ref_prefix(kind);

        let mut ids = Vec::new();
        for entry in git.list_refs_by_prefix(&prefix)? {
            let Some(rest) = entry.name.strip_prefix(&prefix) else {
                continue;
            };
            match EntityId::new(rest) {
                Ok(id) => ids.push(id),
                Err(_) => debug!(refname = %entry.name, "skipping foreign ref"),
            }
        }

        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}
