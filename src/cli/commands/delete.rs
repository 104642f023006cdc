//! delete command - Remove an entity's branch
//!
//! Commits stay in the object database, so hashes printed earlier by
//! `pv history` remain readable with `pv show` until garbage collection.

use anyhow::Result;
use serde_json::json;

use super::Context;
use crate::core::naming::entity_branch;
use crate::core::types::{EntityId, EntityKind};
use crate::ui::output;

/// Delete the branch of `kind`/`id`.
pub fn delete(ctx: &Context, kind: EntityKind, id: &EntityId) -> Result<()> {
    let store = ctx.open_store()?;
    store.delete_branch(kind, id)?;

    let branch = entity_branch(kind, id);
    if ctx.json {
        output::json(&json!({ "deleted": branch }))?;
    } else {
        output::print(format!("Deleted {}", branch), ctx.verbosity);
    }
    Ok(())
}
