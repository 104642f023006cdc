//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! The first existing file wins:
//! 1. Explicit path (`--config`); it must exist
//! 2. `$PROOMPT_VERSIONS_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/proompt/versions.toml`
//! 4. `~/.proompt/versions.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use proompt_versions::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//!
//! println!("Repository: {}", config.repo_dir().unwrap().display());
//! println!("Default branch: {}", config.default_branch());
//! println!("Author: {} <{}>", config.author_name(), config.author_email());
//! ```

pub mod schema;

pub use schema::{AuthorConfig, FileConfig, LoggingConfig, StorageConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::BranchName;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PROOMPT_VERSIONS_CONFIG";

pub const DEFAULT_REPOS_DIR: &str = "~/.proompt/repos";
pub const DEFAULT_REPO_NAME: &str = "git-repo";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_AUTHOR_NAME: &str = "Proompt";
pub const DEFAULT_AUTHOR_EMAIL: &str = "proompt@local";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (all defaults if no file was found)
    pub file: FileConfig,
    /// Path to the config file (if loaded)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, or if a config file
    /// exists but cannot be parsed or fails validation. A missing default
    /// file is not an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        match Self::locate(explicit, &env, dirs::home_dir())? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Read, parse and validate one config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Find the config file to load, following the search order.
    fn locate(
        explicit: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        // 1. Explicit path must exist
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file does not exist",
                    ),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        // 2. $PROOMPT_VERSIONS_CONFIG
        if let Some(path) = env(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 3. $XDG_CONFIG_HOME/proompt/versions.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("proompt/versions.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 4. ~/.proompt/versions.toml
        if let Some(home) = home {
            let path = home.join(".proompt/versions.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.proompt/versions.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".proompt/versions.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory, then renames it into place.
    pub fn write(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Parent directory of the repository, with `~` expanded.
    ///
    /// Defaults to `~/.proompt/repos`.
    pub fn repos_dir(&self) -> Result<PathBuf, ConfigError> {
        let raw = self
            .file
            .storage
            .repos_dir
            .as_deref()
            .unwrap_or(DEFAULT_REPOS_DIR);
        expand_tilde(raw, dirs::home_dir())
    }

    /// Repository directory name.
    ///
    /// Defaults to `git-repo`.
    pub fn repo_name(&self) -> &str {
        self.file
            .storage
            .repo_name
            .as_deref()
            .unwrap_or(DEFAULT_REPO_NAME)
    }

    /// Full path of the repository working directory.
    pub fn repo_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.repos_dir()?.join(self.repo_name()))
    }

    /// Branch holding the marker commit.
    ///
    /// Defaults to `main`. The configured value was validated at load time.
    pub fn default_branch(&self) -> BranchName {
        self.file
            .storage
            .default_branch
            .as_deref()
            .and_then(|b| BranchName::new(b).ok())
            .unwrap_or_else(|| BranchName::from_static(DEFAULT_BRANCH))
    }

    /// Commit author name.
    pub fn author_name(&self) -> &str {
        self.file
            .author
            .name
            .as_deref()
            .unwrap_or(DEFAULT_AUTHOR_NAME)
    }

    /// Commit author email.
    pub fn author_email(&self) -> &str {
        self.file
            .author
            .email
            .as_deref()
            .unwrap_or(DEFAULT_AUTHOR_EMAIL)
    }

    /// Default log filter level.
    pub fn log_level(&self) -> &str {
        self.file
            .logging
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(raw: &str, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if raw == "~" {
        return home.ok_or(ConfigError::NoHomeDir);
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home.ok_or(ConfigError::NoHomeDir)?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod locate {
        use super::*;

        #[test]
        fn nothing_found_uses_defaults() {
            let temp = TempDir::new().unwrap();
            let env = env_from(&[]);
            let found = Config::locate(None, &env, Some(temp.path().to_path_buf())).unwrap();
            assert!(found.is_none());
        }

        #[test]
        fn explicit_path_must_exist() {
            let temp = TempDir::new().unwrap();
            let missing = temp.path().join("nope.toml");
            let env = env_from(&[]);
            let result = Config::locate(Some(&missing), &env, None);
            assert!(matches!(result, Err(ConfigError::ReadError { .. })));
        }

        #[test]
        fn env_var_beats_xdg_and_home() {
            let temp = TempDir::new().unwrap();
            let env_file = temp.path().join("env.toml");
            fs::write(&env_file, "").unwrap();

            let xdg = temp.path().join("xdg");
            fs::create_dir_all(xdg.join("proompt")).unwrap();
            fs::write(xdg.join("proompt/versions.toml"), "").unwrap();

            let env = env_from(&[
                (CONFIG_ENV, env_file.display().to_string()),
                ("XDG_CONFIG_HOME", xdg.display().to_string()),
            ]);
            let found = Config::locate(None, &env, None).unwrap();
            assert_eq!(found, Some(env_file));
        }

        #[test]
        fn xdg_beats_home() {
            let temp = TempDir::new().unwrap();
            let xdg = temp.path().join("xdg");
            fs::create_dir_all(xdg.join("proompt")).unwrap();
            fs::write(xdg.join("proompt/versions.toml"), "").unwrap();

            let home = temp.path().join("home");
            fs::create_dir_all(home.join(".proompt")).unwrap();
            fs::write(home.join(".proompt/versions.toml"), "").unwrap();

            let env = env_from(&[("XDG_CONFIG_HOME", xdg.display().to_string())]);
            let found = Config::locate(None, &env, Some(home)).unwrap();
            assert_eq!(found, Some(xdg.join("proompt/versions.toml")));
        }

        #[test]
        fn home_fallback() {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join(".proompt")).unwrap();
            let path = temp.path().join(".proompt/versions.toml");
            fs::write(&path, "").unwrap();

            let env = env_from(&[]);
            let found = Config::locate(None, &env, Some(temp.path().to_path_buf())).unwrap();
            assert_eq!(found, Some(path));
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn defaults() {
            let config = Config::default();
            assert_eq!(config.repo_name(), "git-repo");
            assert_eq!(config.default_branch().as_str(), "main");
            assert_eq!(config.author_name(), "Proompt");
            assert_eq!(config.author_email(), "proompt@local");
            assert_eq!(config.log_level(), "info");
            assert!(config.loaded_from().is_none());
        }

        #[test]
        fn from_file_applies_values() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("versions.toml");
            fs::write(
                &path,
                r#"
                [storage]
                repos_dir = "/data"
                default_branch = "trunk"
                "#,
            )
            .unwrap();

            let config = Config::load(Some(&path)).unwrap();
            assert_eq!(config.repos_dir().unwrap(), PathBuf::from("/data"));
            assert_eq!(config.repo_dir().unwrap(), PathBuf::from("/data/git-repo"));
            assert_eq!(config.default_branch().as_str(), "trunk");
            assert_eq!(config.loaded_from(), Some(path.as_path()));
        }

        #[test]
        fn invalid_value_rejected() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("versions.toml");
            fs::write(&path, "[logging]\nlevel = \"loud\"").unwrap();

            assert!(matches!(
                Config::from_file(&path),
                Err(ConfigError::InvalidValue(_))
            ));
        }

        #[test]
        fn parse_error_names_path() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("versions.toml");
            fs::write(&path, "[storage\n").unwrap();

            let err = Config::from_file(&path).unwrap_err();
            assert!(err.to_string().contains("versions.toml"));
        }
    }

    mod writing {
        use super::*;

        #[test]
        fn write_then_load() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("nested/versions.toml");

            let file = FileConfig {
                storage: StorageConfig {
                    repo_name: Some("store".into()),
                    ..Default::default()
                },
                ..Default::default()
            };
            Config::write(&path, &file).unwrap();

            assert!(path.exists());
            assert!(!path.with_extension("toml.tmp").exists());
            let loaded = Config::from_file(&path).unwrap();
            assert_eq!(loaded.repo_name(), "store");
        }

        #[test]
        fn write_rejects_invalid() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("versions.toml");
            let file = FileConfig {
                logging: LoggingConfig {
                    level: Some("chatty".into()),
                },
                ..Default::default()
            };
            assert!(Config::write(&path, &file).is_err());
            assert!(!path.exists());
        }
    }

    mod tilde {
        use super::*;

        #[test]
        fn expands_home_prefix() {
            let home = PathBuf::from("/home/user");
            assert_eq!(
                expand_tilde("~/.proompt/repos", Some(home.clone())).unwrap(),
                PathBuf::from("/home/user/.proompt/repos")
            );
            assert_eq!(expand_tilde("~", Some(home)).unwrap(), PathBuf::from("/home/user"));
        }

        #[test]
        fn leaves_other_paths() {
            assert_eq!(
                expand_tilde("/abs/path", None).unwrap(),
                PathBuf::from("/abs/path")
            );
            assert_eq!(
                expand_tilde("~other/x", None).unwrap(),
                PathBuf::from("~other/x")
            );
        }

        #[test]
        fn missing_home_is_error() {
            assert!(matches!(
                expand_tilde("~/x", None),
                Err(ConfigError::NoHomeDir)
            ));
        }
    }
}
