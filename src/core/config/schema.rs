//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Layout
//!
//! ```toml
//! [storage]
//! repos_dir = "~/.proompt/repos"
//! repo_name = "git-repo"
//! default_branch = "main"
//!
//! [author]
//! name = "Proompt"
//! email = "proompt@local"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every key is optional; accessors on [`Config`](super::Config) apply the
//! defaults.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., `default_branch` must
//! be a valid branch name, `repo_name` a single path component).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Accepted `logging.level` values.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Where the repository lives
    pub storage: StorageConfig,

    /// Synthetic commit identity
    pub author: AuthorConfig,

    /// Log filter defaults
    pub logging: LoggingConfig,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.author.validate()?;
        self.logging.validate()
    }
}

/// `[storage]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Parent directory of the repository (`~` is expanded)
    pub repos_dir: Option<String>,

    /// Repository directory name
    pub repo_name: Option<String>,

    /// Branch holding the marker commit
    pub default_branch: Option<String>,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.repos_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "storage.repos_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(name) = &self.repo_name {
            let single_component = !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains('/')
                && !name.contains('\\');
            if !single_component {
                return Err(ConfigError::InvalidValue(format!(
                    "storage.repo_name '{}' must be a single directory name",
                    name
                )));
            }
        }

        if let Some(branch) = &self.default_branch {
            BranchName::new(branch).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid storage.default_branch: {}", e))
            })?;
        }

        Ok(())
    }
}

/// `[author]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "author.name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(email) = &self.email {
            // git2 rejects identities containing angle brackets
            if email.trim().is_empty() || email.contains(['<', '>']) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid author.email '{}'",
                    email
                )));
            }
        }
        Ok(())
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of [`LOG_LEVELS`]
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid logging.level '{}', must be one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
