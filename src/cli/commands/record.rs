//! create and update commands - Record a version from entity JSON
//!
//! The entity is read from a file (or stdin with `-`) in the same JSON
//! shape the CRUD layer stores, including its `id`.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::Context;
use crate::cli::args::RecordArgs;
use crate::core::entity::{Prompt, Snippet, VersionedEntity};
use crate::core::naming::entity_branch;
use crate::core::ops::Interrupt;
use crate::core::types::{EntityKind, Oid};
use crate::ui::output::{self, Verbosity};
use crate::versions::VersionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Record the first version of an entity.
pub fn create(ctx: &Context, kind: EntityKind, input: &RecordArgs) -> Result<()> {
    record(ctx, kind, input, Mode::Create)
}

/// Record a new version of an existing entity.
pub fn update(ctx: &Context, kind: EntityKind, input: &RecordArgs) -> Result<()> {
    record(ctx, kind, input, Mode::Update)
}

fn record(ctx: &Context, kind: EntityKind, input: &RecordArgs, mode: Mode) -> Result<()> {
    let raw = read_input(&input.file)?;
    let interrupt = match input.timeout {
        Some(secs) => Interrupt::none().with_timeout(Duration::from_secs(secs)),
        None => Interrupt::none(),
    };
    let store = ctx.open_store()?;

    match kind {
        EntityKind::Prompt => apply::<Prompt>(ctx, &store, &raw, &input.note, &interrupt, mode),
        EntityKind::Snippet => apply::<Snippet>(ctx, &store, &raw, &input.note, &interrupt, mode),
    }
}

fn apply<E: VersionedEntity + DeserializeOwned>(
    ctx: &Context,
    store: &VersionStore,
    raw: &str,
    note: &str,
    interrupt: &Interrupt,
    mode: Mode,
) -> Result<()> {
    let entity: E = serde_json::from_str(raw)
        .with_context(|| format!("Input is not a valid {}", E::KIND))?;

    let oid: Oid = match mode {
        Mode::Create => store.create_branch(&entity, note, interrupt)?,
        Mode::Update => store.update_branch(&entity, note, interrupt)?,
    };
    let branch = entity_branch(E::KIND, entity.id());

    if ctx.json {
        output::json(&json!({
            "kind": E::KIND.as_str(),
            "id": entity.id(),
            "branch": branch,
            "commit": oid,
        }))?;
    } else {
        let verb = match mode {
            Mode::Create => "Created",
            Mode::Update => "Updated",
        };
        output::print(format!("{} {} at {}", verb, branch, oid.short(7)), ctx.verbosity);
        if ctx.verbosity == Verbosity::Quiet {
            output::data(&oid);
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read entity JSON from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
