//! core::naming
//!
//! Branch naming and commit message rules.
//!
//! # Features
//!
//! - Derive an entity's branch from its kind and id (`prompts/<id>`)
//! - Build commit messages (`Create: <title>` / `Update: <title>`)
//! - Split stored messages back into summary and body
//!
//! Branch names are never user supplied. Since [`EntityId`] only admits a
//! single safe ref component, the derived name cannot collide across kinds
//! or traverse out of its namespace.

use super::types::{BranchName, EntityId, EntityKind, RefName};

/// The single file stored in every entity commit.
pub const CONTENT_FILE: &str = "content.json";

/// The marker file committed on the default branch at initialization.
pub const MARKER_FILE: &str = "README.md";

/// Which lifecycle step produced a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    Create,
    Update,
}

impl MessageAction {
    pub fn label(&self) -> &'static str {
        match self {
            MessageAction::Create => "Create",
            MessageAction::Update => "Update",
        }
    }
}

/// Derive the branch for an entity.
///
/// # Example
///
/// ```
/// use proompt_versions::core::naming::entity_branch;
/// use proompt_versions::core::types::{EntityId, EntityKind};
///
/// let id = EntityId::new("abc-123").unwrap();
/// assert_eq!(entity_branch(EntityKind::Prompt, &id).as_str(), "prompts/abc-123");
/// assert_eq!(entity_branch(EntityKind::Snippet, &id).as_str(), "snippets/abc-123");
/// ```
pub fn entity_branch(kind: EntityKind, id: &EntityId) -> BranchName {
    BranchName::for_entity(kind, id)
}

/// Full ref for an entity's branch.
pub fn entity_ref(kind: EntityKind, id: &EntityId) -> RefName {
    RefName::for_branch(&entity_branch(kind, id))
}

/// Ref prefix under which all branches of a kind live.
pub fn kind_ref_prefix(kind: EntityKind) -> String {
    format!("refs/heads/{}/", kind.plural())
}

/// Build a commit message for a lifecycle step.
///
/// The first line is the action summary; a non-empty annotation becomes the
/// body, separated by a blank line.
///
/// # Example
///
/// ```
/// use proompt_versions::core::naming::{commit_message, MessageAction};
///
/// assert_eq!(commit_message(MessageAction::Create, "Draft", ""), "Create: Draft");
/// assert_eq!(
///     commit_message(MessageAction::Update, "Final", "polish wording"),
///     "Update: Final\n\npolish wording"
/// );
/// ```
pub fn commit_message(action: MessageAction, title: &str, annotation: &str) -> String {
    let mut message = format!("{}: {}", action.label(), title);
    if !annotation.is_empty() {
        message.push_str("\n\n");
        message.push_str(annotation);
    }
    message
}

/// Split a commit message into its summary line and body.
///
/// The body is everything after the first blank line, with surrounding
/// newlines trimmed. Messages without a body yield an empty body.
pub fn split_message(message: &str) -> (&str, &str) {
    match message.split_once("\n\n") {
        Some((summary, body)) => (summary.trim_end(), body.trim_matches('\n')),
        None => (message.trim_end_matches('\n'), ""),
    }
}
