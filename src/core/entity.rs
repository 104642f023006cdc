//! core::entity
//!
//! Versioned content entities and their stored snapshots.
//!
//! # Overview
//!
//! A [`Prompt`] or [`Snippet`] is owned by the primary datastore; this crate
//! only sees it when the CRUD layer asks for a version to be recorded. What
//! lands in git is the entity's snapshot ([`PromptSnapshot`],
//! [`SnippetSnapshot`]), serialized as `content.json`.
//!
//! Snapshots are lossless: every field of the entity is carried, so
//! `E::from_snapshot(entity.snapshot())` reproduces the entity exactly.
//! Reading a stored snapshot back gives bit-identical floats only because
//! `serde_json` is built with `float_roundtrip`. JSON has no NaN or
//! infinity, so [`VersionedEntity::validate`] rejects a non-finite
//! temperature before anything is written.
//!
//! # Schema
//!
//! Snapshot field names are the on-disk format and must stay stable. New
//! optional fields use `#[serde(default)]` so older commits stay readable.
//! Snapshots deny unknown fields, so a prompt's content never decodes as a
//! snippet or the other way round.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{EntityId, EntityKind, TypeError};

/// Free-form parameters attached to a prompt.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// An entity whose content is versioned on its own orphan branch.
pub trait VersionedEntity: Sized {
    /// The serialized field set stored in each commit.
    type Snapshot: Serialize + DeserializeOwned;

    /// The entity kind (selects the branch namespace).
    const KIND: EntityKind;

    /// The entity's stable id.
    fn id(&self) -> &EntityId;

    /// Human-readable title used in commit summaries.
    fn title(&self) -> &str;

    /// Build the snapshot for the entity's current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Rebuild the entity from a stored snapshot.
    fn from_snapshot(snapshot: Self::Snapshot) -> Self;

    /// The id recorded inside a snapshot.
    fn snapshot_id(snapshot: &Self::Snapshot) -> &EntityId;

    /// Reject values the stored form cannot represent.
    fn validate(&self) -> Result<(), TypeError> {
        Ok(())
    }
}

/// Prompt role/media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptType {
    System,
    User,
    Image,
    Video,
}

impl PromptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::System => "system",
            PromptType::User => "user",
            PromptType::Image => "image",
            PromptType::Video => "video",
        }
    }
}

impl std::fmt::Display for PromptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prompt as handed over by the CRUD layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub prompt_type: PromptType,
    #[serde(default)]
    pub use_case: Option<String>,
    #[serde(default)]
    pub model_compatibility_tags: Vec<String>,
    #[serde(default)]
    pub temperature_suggestion: Option<f64>,
    #[serde(default)]
    pub other_parameters: Parameters,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stored form of a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptSnapshot {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub prompt_type: PromptType,
    #[serde(default)]
    pub use_case: Option<String>,
    #[serde(default)]
    pub model_compatibility: Vec<String>,
    #[serde(default)]
    pub temperature_suggestion: Option<f64>,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VersionedEntity for Prompt {
    type Snapshot = PromptSnapshot;
    const KIND: EntityKind = EntityKind::Prompt;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn snapshot(&self) -> PromptSnapshot {
        PromptSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            prompt_type: self.prompt_type,
            use_case: self.use_case.clone(),
            model_compatibility: self.model_compatibility_tags.clone(),
            temperature_suggestion: self.temperature_suggestion,
            parameters: self.other_parameters.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_snapshot(snapshot: PromptSnapshot) -> Self {
        Prompt {
            id: snapshot.id,
            title: snapshot.title,
            content: snapshot.content,
            prompt_type: snapshot.prompt_type,
            use_case: snapshot.use_case,
            model_compatibility_tags: snapshot.model_compatibility,
            temperature_suggestion: snapshot.temperature_suggestion,
            other_parameters: snapshot.parameters,
            tags: snapshot.tags,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    fn snapshot_id(snapshot: &PromptSnapshot) -> &EntityId {
        &snapshot.id
    }

    fn validate(&self) -> Result<(), TypeError> {
        match self.temperature_suggestion {
            Some(t) if !t.is_finite() => Err(TypeError::NonFiniteNumber(format!(
                "temperature_suggestion is {}",
                t
            ))),
            _ => Ok(()),
        }
    }
}

/// A snippet as handed over by the CRUD layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stored form of a [`Snippet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnippetSnapshot {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VersionedEntity for Snippet {
    type Snapshot = SnippetSnapshot;
    const KIND: EntityKind = EntityKind::Snippet;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn snapshot(&self) -> SnippetSnapshot {
        SnippetSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_snapshot(snapshot: SnippetSnapshot) -> Self {
        Snippet {
            id: snapshot.id,
            title: snapshot.title,
            content: snapshot.content,
            description: snapshot.description,
            tags: snapshot.tags,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    fn snapshot_id(snapshot: &SnippetSnapshot) -> &EntityId {
        &snapshot.id
    }
}
