//! history and show commands - Read past versions

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::entity::{Prompt, Snippet};
use crate::core::types::{EntityId, EntityKind};
use crate::ui::output;

/// Print an entity's versions, newest first.
pub fn history(ctx: &Context, kind: EntityKind, id: &EntityId) -> Result<()> {
    let store = ctx.open_store()?;
    let records = store.history(kind, id)?;

    if ctx.json {
        output::json(&records)?;
        return Ok(());
    }

    for record in &records {
        output::data(output::format_record(record));
    }
    Ok(())
}

/// Print the entity as recorded at `hash`, as JSON.
///
/// The entity is always JSON; `--json` only affects pretty-printing, which
/// is on either way.
pub fn show(ctx: &Context, kind: EntityKind, id: &EntityId, hash: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let context = || format!("Cannot read {} {} at {}", kind, id, hash);

    match kind {
        EntityKind::Prompt => {
            let prompt: Prompt = store.version(id, hash).with_context(context)?;
            output::json(&prompt)?;
        }
        EntityKind::Snippet => {
            let snippet: Snippet = store.version(id, hash).with_context(context)?;
            output::json(&snippet)?;
        }
    }
    Ok(())
}
