//! versions::history
//!
//! Read-only access to an entity's versions.
//!
//! Reads never touch HEAD, the worktree or the write locks. Historical
//! content comes straight from commit trees, so reads can run alongside a
//! mutation in progress.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{VersionError, VersionStore};
use crate::core::entity::VersionedEntity;
use crate::core::naming::{entity_branch, entity_ref, CONTENT_FILE};
use crate::core::types::{BranchName, EntityId, EntityKind, Oid};
use crate::git::{CommitInfo, GitError};

/// One version of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: Oid,
    /// Complete commit message
    pub message: String,
    /// First line of the message
    pub summary: String,
    /// Message after the first blank line (the annotation), possibly empty
    pub body: String,
    pub author_name: String,
    pub author_email: String,
    /// Author time, second precision
    pub timestamp: DateTime<Utc>,
    /// Parent hashes; empty for the root version
    pub parents: Vec<Oid>,
}

impl CommitRecord {
    /// Whether this is the first version of the entity.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

impl From<CommitInfo> for CommitRecord {
    fn from(info: CommitInfo) -> Self {
        Self {
            hash: info.oid,
            message: info.message,
            summary: info.summary,
            body: info.body,
            author_name: info.author_name,
            author_email: info.author_email,
            timestamp: info.author_time,
            parents: info.parents,
        }
    }
}

impl VersionStore {
    /// Every version of an entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::BranchNotFound`] if the entity has no branch.
    /// An existing branch always yields at least one record.
    pub fn history(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<Vec<CommitRecord>, VersionError> {
        let branch = entity_branch(kind, id);
        let git = self.git()?;

        let tip = git
            .try_resolve_ref(entity_ref(kind, id).as_str())?
            .ok_or_else(|| VersionError::BranchNotFound {
                branch: branch.clone(),
            })?;

        let records: Vec<CommitRecord> = git
            .log(&tip)?
            .into_iter()
            .map(CommitRecord::from)
            .collect();

        debug!(branch = %branch, count = records.len(), "read history");
        Ok(records)
    }

    /// The entity as recorded at commit `hash`.
    ///
    /// The commit is looked up directly, so a hash stays readable after its
    /// branch is deleted until the object is garbage collected.
    ///
    /// # Errors
    ///
    /// - [`VersionError::VersionNotFound`] if the hash is malformed, names no
    ///   commit, its tree has no `content.json`, or the snapshot belongs to a
    ///   different entity
    /// - [`VersionError::UnreadableVersion`] if `content.json` does not
    ///   decode as the entity's snapshot, which includes content stored
    ///   for the other entity kind
    pub fn version<E: VersionedEntity>(
        &self,
        id: &EntityId,
        hash: &str,
    ) -> Result<E, VersionError> {
        let branch = entity_branch(E::KIND, id);
        let not_found = |branch: &BranchName| VersionError::VersionNotFound {
            branch: branch.clone(),
            hash: hash.to_string(),
        };

        let Ok(oid) = Oid::new(hash) else {
            return Err(not_found(&branch));
        };

        let git = self.git()?;
        let bytes = match git.read_file_at(&oid, Path::new(CONTENT_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() || matches!(e, GitError::InvalidOid { .. }) => {
                debug!(branch = %branch, commit = %oid, error = %e, "version lookup missed");
                return Err(not_found(&branch));
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: E::Snapshot =
            serde_json::from_slice(&bytes).map_err(|source| VersionError::UnreadableVersion {
                branch: branch.clone(),
                hash: oid.to_string(),
                source,
            })?;

        if E::snapshot_id(&snapshot) != id {
            debug!(
                branch = %branch,
                commit = %oid,
                found = %E::snapshot_id(&snapshot),
                "version belongs to another entity"
            );
            return Err(not_found(&branch));
        }

        Ok(E::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Prompt, PromptType, Snippet};
    use crate::core::ops::Interrupt;
    use crate::versions::{ErrorKind, StoreSettings};
    use tempfile::TempDir;

    fn setup() -> (TempDir, VersionStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(StoreSettings::new(temp.path())).unwrap();
        (temp, store)
    }

    fn snippet(id: &str, content: &str) -> Snippet {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        Snippet {
            id: EntityId::new(id).unwrap(),
            title: "Snip".into(),
            content: content.into(),
            description: None,
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    mod history {
        use super::*;

        #[test]
        fn newest_first_and_linear() {
            let (_temp, store) = setup();
            let mut s = snippet("s1", "v0");
            store.create_branch(&s, "", &Interrupt::none()).unwrap();
            for i in 1..=3 {
                s.content = format!("v{i}");
                store
                    .update_branch(&s, &format!("step {i}"), &Interrupt::none())
                    .unwrap();
            }

            let records = store.history(EntityKind::Snippet, &s.id).unwrap();
            assert_eq!(records.len(), 4);
            assert_eq!(records[0].body, "step 3");
            assert!(records[3].summary.starts_with("Create:"));
            assert!(records[3].is_root());
            for pair in records.windows(2) {
                assert_eq!(pair[0].parents, vec![pair[1].hash.clone()]);
            }
        }

        #[test]
        fn records_author_and_message() {
            let (_temp, store) = setup();
            let s = snippet("s1", "v0");
            store.create_branch(&s, "note", &Interrupt::none()).unwrap();

            let record = &store.history(EntityKind::Snippet, &s.id).unwrap()[0];
            assert_eq!(record.message, "Create: Snip\n\nnote");
            assert_eq!(record.summary, "Create: Snip");
            assert_eq!(record.author_name, "Proompt");
            assert_eq!(record.author_email, "proompt@local");
        }

        #[test]
        fn missing_branch_is_not_found() {
            let (_temp, store) = setup();
            let id = EntityId::new("nope").unwrap();
            let err = store.history(EntityKind::Prompt, &id).unwrap_err();
            assert!(matches!(err, VersionError::BranchNotFound { .. }));
        }

        #[test]
        fn serializes_for_output() {
            let (_temp, store) = setup();
            let s = snippet("s1", "v0");
            store.create_branch(&s, "", &Interrupt::none()).unwrap();

            let records = store.history(EntityKind::Snippet, &s.id).unwrap();
            let json = serde_json::to_value(&records).unwrap();
            assert_eq!(json[0]["summary"], "Create: Snip");
            assert_eq!(json[0]["parents"], serde_json::json!([]));
        }
    }

    mod version {
        use super::*;

        #[test]
        fn reads_each_historical_state() {
            let (_temp, store) = setup();
            let mut s = snippet("s1", "first");
            let first = store.create_branch(&s, "", &Interrupt::none()).unwrap();
            let original = s.clone();
            s.content = "second".into();
            store.update_branch(&s, "", &Interrupt::none()).unwrap();

            let old: Snippet = store.version(&s.id, first.as_str()).unwrap();
            assert_eq!(old, original);
        }

        #[test]
        fn accepts_uppercase_hash() {
            let (_temp, store) = setup();
            let s = snippet("s1", "x");
            let oid = store.create_branch(&s, "", &Interrupt::none()).unwrap();

            let read: Snippet = store
                .version(&s.id, &oid.as_str().to_ascii_uppercase())
                .unwrap();
            assert_eq!(read.content, "x");
        }

        #[test]
        fn malformed_hash_is_not_found() {
            let (_temp, store) = setup();
            let id = EntityId::new("s1").unwrap();
            let err = store.version::<Snippet>(&id, "not-a-hash").unwrap_err();
            assert!(matches!(err, VersionError::VersionNotFound { .. }));
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[test]
        fn unknown_commit_is_not_found() {
            let (_temp, store) = setup();
            let id = EntityId::new("s1").unwrap();
            let err = store
                .version::<Snippet>(&id, &"0".repeat(40))
                .unwrap_err();
            assert!(matches!(err, VersionError::VersionNotFound { .. }));
        }

        #[test]
        fn marker_commit_is_not_a_version() {
            let (_temp, store) = setup();
            let tip = store.git().unwrap().resolve_ref("refs/heads/main").unwrap();
            let id = EntityId::new("s1").unwrap();
            let err = store.version::<Snippet>(&id, tip.as_str()).unwrap_err();
            assert!(matches!(err, VersionError::VersionNotFound { .. }));
        }

        #[test]
        fn other_entity_hash_is_not_found() {
            let (_temp, store) = setup();
            let a = snippet("a", "x");
            let oid = store.create_branch(&a, "", &Interrupt::none()).unwrap();

            let b = EntityId::new("b").unwrap();
            let err = store.version::<Snippet>(&b, oid.as_str()).unwrap_err();
            assert!(matches!(err, VersionError::VersionNotFound { .. }));
        }

        #[test]
        fn wrong_kind_is_unreadable() {
            let (_temp, store) = setup();
            let s = snippet("s1", "x");
            let oid = store.create_branch(&s, "", &Interrupt::none()).unwrap();

            // A snippet snapshot lacks the prompt's required `type` field
            let err = store.version::<Prompt>(&s.id, oid.as_str()).unwrap_err();
            assert!(matches!(err, VersionError::UnreadableVersion { .. }));
            assert!(err.is_version_unavailable());
        }

        #[test]
        fn prompt_is_not_readable_as_snippet() {
            let (_temp, store) = setup();
            let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
            let p = Prompt {
                id: EntityId::new("x1").unwrap(),
                title: "Secret prompt".into(),
                content: "c".into(),
                prompt_type: PromptType::User,
                use_case: None,
                model_compatibility_tags: vec![],
                temperature_suggestion: None,
                other_parameters: Default::default(),
                tags: vec![],
                created_at: at,
                updated_at: at,
            };
            let oid = store.create_branch(&p, "", &Interrupt::none()).unwrap();

            let err = store.version::<Snippet>(&p.id, oid.as_str()).unwrap_err();
            assert!(matches!(err, VersionError::UnreadableVersion { .. }));
            assert!(err.is_version_unavailable());
        }

        #[test]
        fn survives_branch_delete() {
            let (_temp, store) = setup();
            let s = snippet("s1", "kept");
            let oid = store.create_branch(&s, "", &Interrupt::none()).unwrap();
            store.delete_branch(EntityKind::Snippet, &s.id).unwrap();

            let read: Snippet = store.version(&s.id, oid.as_str()).unwrap();
            assert_eq!(read.content, "kept");
        }

        #[test]
        fn prompt_fields_round_trip() {
            let (_temp, store) = setup();
            let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
            let mut params = crate::core::entity::Parameters::new();
            params.insert("top_p".into(), serde_json::json!(0.9));
            let p = Prompt {
                id: EntityId::new("p1").unwrap(),
                title: "Draft".into(),
                content: "Summarize {{text}}".into(),
                prompt_type: PromptType::System,
                use_case: Some("summaries".into()),
                model_compatibility_tags: vec!["gpt-4".into()],
                temperature_suggestion: Some(0.3),
                other_parameters: params,
                tags: vec!["work".into()],
                created_at: at,
                updated_at: at,
            };
            let oid = store.create_branch(&p, "", &Interrupt::none()).unwrap();

            let read: Prompt = store.version(&p.id, oid.as_str()).unwrap();
            assert_eq!(read, p);
        }
    }
}
