//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the store from the resolved settings
//! 2. Calls one [`VersionStore`] operation
//! 3. Formats and displays output
//!
//! Handlers do NOT touch the repository directly; every read and write
//! goes through the store.

mod delete;
mod history;
mod init;
mod list;
mod record;

pub use delete::delete;
pub use history::{history, show};
pub use init::{init, validate};
pub use list::list;
pub use record::{create, update};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::ui::output::Verbosity;
use crate::versions::{StoreSettings, VersionStore};

/// Everything a handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration (defaults if no file was found)
    pub config: Config,
    /// Explicit `--config` path, if given
    pub config_path: Option<PathBuf>,
    /// `--repos-dir` override
    pub repos_dir: Option<PathBuf>,
    pub verbosity: Verbosity,
    /// Emit JSON instead of text
    pub json: bool,
    /// Fail instead of waiting for the repository lock
    pub no_wait: bool,
}

impl Context {
    /// Store settings after applying CLI overrides to the config.
    pub fn settings(&self) -> Result<StoreSettings> {
        let mut settings =
            StoreSettings::from_config(&self.config).context("Invalid storage configuration")?;
        if let Some(dir) = &self.repos_dir {
            settings.repos_dir = dir.clone();
        }
        Ok(settings.with_lock_wait(!self.no_wait))
    }

    /// Open (creating if needed) the version store.
    pub fn open_store(&self) -> Result<VersionStore> {
        let settings = self.settings()?;
        let repo_dir = settings.paths().repo_dir();
        VersionStore::open(settings)
            .with_context(|| format!("Failed to open version store at {}", repo_dir.display()))
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { write_config } => init::init(ctx, write_config),
        Command::Validate => init::validate(ctx),
        Command::List { kind } => list::list(ctx, kind),
        Command::History { kind, id } => history::history(ctx, kind, &id),
        Command::Show { kind, id, hash } => history::show(ctx, kind, &id, &hash),
        Command::Create { kind, input } => record::create(ctx, kind, &input),
        Command::Update { kind, input } => record::update(ctx, kind, &input),
        Command::Delete { kind, id } => delete::delete(ctx, kind, &id),
    }
}
