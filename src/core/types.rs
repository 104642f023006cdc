//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Validated Git reference name
//! - [`EntityKind`] - Which kind of content an entity is (prompt or snippet)
//! - [`EntityId`] - Opaque, validated entity identifier
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so a branch derived from an [`EntityKind`] and an
//! [`EntityId`] is always a legal Git ref.
//!
//! # Examples
//!
//! ```
//! use proompt_versions::core::types::{BranchName, EntityId, Oid, RefName};
//!
//! // Valid constructions
//! let branch = BranchName::new("prompts/p-1").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::for_branch(&branch);
//! assert_eq!(refname.as_str(), "refs/heads/prompts/p-1");
//!
//! // Invalid constructions fail at creation time
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(EntityId::new("../escape").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("non-finite number: {0}")]
    NonFiniteNumber(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock`, `/` or `.`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use proompt_versions::core::types::BranchName;
///
/// let name = BranchName::new("snippets/s-42").unwrap();
/// assert_eq!(name.as_str(), "snippets/s-42");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a branch name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }

        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }

        if name.starts_with('.') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '.'".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }

        if name.ends_with(".lock") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock'".into(),
            ));
        }
        if name.ends_with('/') || name.ends_with('.') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '/' or '.'".into(),
            ));
        }

        if name.contains("..") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '//'".into(),
            ));
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidBranchName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidBranchName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Wrap a compile-time constant branch name.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::validate(name).is_ok(), "invalid constant branch {name}");
        Self(name.to_string())
    }

    /// Create the branch name owned by an entity (`<kind-plural>/<id>`).
    pub fn for_entity(kind: EntityKind, id: &EntityId) -> Self {
        // Entity ids are validated single ref components
        Self(format!("{}/{}", kind.plural(), id.as_str()))
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency. Commit hashes handed
/// back by the history reader are `Oid`s, and a hash passed in by a caller
/// is parsed into one before any object lookup.
///
/// # Example
///
/// ```
/// use proompt_versions::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().trim().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git reference name.
///
/// # Example
///
/// ```
/// use proompt_versions::core::types::{BranchName, RefName};
///
/// let branch = BranchName::new("prompts/abc").unwrap();
/// let refname = RefName::for_branch(&branch);
/// assert_eq!(refname.as_str(), "refs/heads/prompts/abc");
/// assert_eq!(refname.strip_prefix("refs/heads/prompts/"), Some("abc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create a ref name for a branch (`refs/heads/<branch>`).
    pub fn for_branch(branch: &BranchName) -> Self {
        // Branch names are validated and the refs/heads/ prefix is valid
        Self(format!("refs/heads/{}", branch.as_str()))
    }

    /// Strip a prefix from the ref name and return the remainder.
    ///
    /// Returns `None` if the ref doesn't start with the given prefix.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name.starts_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '/'".into(),
            ));
        }

        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        if name.contains("..") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '//'".into(),
            ));
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a versioned entity.
///
/// The kind selects the branch namespace (`prompts/` or `snippets/`) and the
/// snapshot schema stored in `content.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Prompt,
    Snippet,
}

impl EntityKind {
    /// All kinds, in a stable order.
    pub const ALL: [EntityKind; 2] = [EntityKind::Prompt, EntityKind::Snippet];

    /// The plural path segment used for the kind's branch namespace.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Prompt => "prompts",
            EntityKind::Snippet => "snippets",
        }
    }

    /// Singular lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Prompt => "prompt",
            EntityKind::Snippet => "snippet",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" | "prompts" => Ok(EntityKind::Prompt),
            "snippet" | "snippets" => Ok(EntityKind::Snippet),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// An opaque entity identifier.
///
/// Ids are single ref components so the derived branch name can never
/// escape its kind's namespace: ASCII letters, digits, `-`, `_` and `.`
/// only, not starting with `.` or `-`, no `..`, not ending in `.` or `.lock`,
/// at most 128 characters.
///
/// # Example
///
/// ```
/// use proompt_versions::core::types::EntityId;
///
/// let id = EntityId::new("3f2a9c4e-1b7d-4e0a-9f7e-0c1d2e3f4a5b").unwrap();
/// assert_eq!(id.as_str().len(), 36);
///
/// assert!(EntityId::new("a/b").is_err());
/// assert!(EntityId::new("").is_err());
///
/// let fresh = EntityId::generate();
/// assert!(EntityId::new(fresh.as_str()).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    const MAX_LEN: usize = 128;

    /// Create a new validated entity id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEntityId` if the id is not a safe ref component.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random (UUID v4) id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.is_empty() {
            return Err(TypeError::InvalidEntityId("id cannot be empty".into()));
        }
        if id.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidEntityId(format!(
                "id longer than {} characters",
                Self::MAX_LEN
            )));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TypeError::InvalidEntityId(format!(
                "id cannot contain {c:?}"
            )));
        }
        if id.starts_with('.') || id.starts_with('-') {
            return Err(TypeError::InvalidEntityId(
                "id cannot start with '.' or '-'".into(),
            ));
        }
        if id.contains("..") {
            return Err(TypeError::InvalidEntityId("id cannot contain '..'".into()));
        }
        if id.ends_with('.') || id.ends_with(".lock") {
            return Err(TypeError::InvalidEntityId(
                "id cannot end with '.' or '.lock'".into(),
            ));
        }
        Ok(())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
