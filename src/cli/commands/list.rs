//! list command - Entities of one kind that have version history

use anyhow::Result;

use super::Context;
use crate::core::types::EntityKind;
use crate::ui::output;

/// List entity ids of `kind`, one per line.
pub fn list(ctx: &Context, kind: EntityKind) -> Result<()> {
    let store = ctx.open_store()?;
    let ids = store.list_entities(kind)?;

    if ctx.json {
        output::json(&ids)?;
    } else if !ids.is_empty() {
        output::data(output::format_list(&ids, ""));
    }
    Ok(())
}
