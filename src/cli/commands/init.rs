//! init and validate commands - Create and health-check the repository

use anyhow::{Context as _, Result};
use serde_json::json;

use super::Context;
use crate::core::config::{Config, FileConfig};
use crate::ui::output;

/// Create the repository if needed, optionally persisting a config file.
pub fn init(ctx: &Context, write_config: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let repo_dir = store.paths().repo_dir();

    let written = if write_config {
        write_config_file(ctx)?
    } else {
        None
    };

    if ctx.json {
        output::json(&json!({
            "repo_dir": repo_dir,
            "default_branch": store.settings().default_branch,
            "config_written": written,
        }))?;
        return Ok(());
    }

    output::print(
        format!("Version store ready at {}", repo_dir.display()),
        ctx.verbosity,
    );
    if let Some(path) = written {
        output::print(format!("Wrote config to {}", path.display()), ctx.verbosity);
    }
    Ok(())
}

/// Write the effective settings to the config path unless a file exists.
///
/// Returns the path written, or `None` if an existing file was kept.
fn write_config_file(ctx: &Context) -> Result<Option<std::path::PathBuf>> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => Config::default_path().context("Cannot determine config location")?,
    };
    if path.exists() {
        tracing::warn!(path = %path.display(), "config file exists, leaving it unchanged");
        return Ok(None);
    }

    let mut file: FileConfig = ctx.config.file.clone();
    if let Some(dir) = &ctx.repos_dir {
        file.storage.repos_dir = Some(dir.display().to_string());
    }
    Config::write(&path, &file)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(Some(path))
}

/// Check the repository without repairing anything.
pub fn validate(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    store.validate().context("Repository validation failed")?;

    if ctx.json {
        output::json(&json!({ "valid": true, "repo_dir": store.paths().repo_dir() }))?;
    } else {
        output::print("Repository OK", ctx.verbosity);
    }
    Ok(())
}
