//! cli
//!
//! Operator command-line interface (`pv`).
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that each call one [`crate::versions::VersionStore`] operation.
//! Errors are wrapped with `anyhow` context here and nowhere else.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::logging;
use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    // `init --write-config` may name a config file that does not exist yet
    let seeding = matches!(cli.command, Command::Init { write_config: true });
    let config = match cli.config.as_deref() {
        Some(path) if seeding && !path.exists() => Config::default(),
        explicit => Config::load(explicit).context("Failed to load configuration")?,
    };
    logging::init(verbosity, config.log_level());
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let ctx = commands::Context {
        config,
        config_path: cli.config.clone(),
        repos_dir: cli.repos_dir.clone(),
        verbosity,
        json: cli.json,
        no_wait: cli.no_wait,
    };

    commands::dispatch(cli.command, &ctx)
}
