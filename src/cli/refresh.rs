//! Refresh command.

use crate::cli::{output, Context};
use crate::core::reconcile;
use crate::error::Result;

/// Re-read all stored resources and save the result.
///
/// Works without a manifest; the backend settings then come from the
/// environment alone.
pub fn execute(ctx: &Context) -> Result<()> {
    let manifest = ctx.optional_manifest()?;
    let backend = ctx.backend(manifest.as_ref().map(|m| &m.settings))?;
    let mut state = ctx.state()?;

    let gone = reconcile::refresh(&backend, &mut state)?;
    ctx.save(&mut state)?;

    for address in &gone {
        output::warn(&format!(
            "{} no longer exists, removed from state",
            output::key(&address.to_string())
        ));
    }
    output::success(&format!(
        "refreshed {} resources",
        state.resources.len() + gone.len()
    ));
    Ok(())
}
