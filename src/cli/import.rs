//! Import command.
//!
//! Adopts an existing vault or membership into state by id.

use crate::cli::{output, Context};
use crate::core::address::Address;
use crate::core::reconcile;
use crate::error::Result;

pub fn execute(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let manifest = ctx.optional_manifest()?;
    let backend = ctx.backend(manifest.as_ref().map(|m| &m.settings))?;
    let mut state = ctx.state()?;

    let resource = reconcile::import(&backend, manifest.as_ref(), &mut state, &address, id)?;
    ctx.save(&mut state)?;

    output::success(&format!(
        "imported {} ({})",
        output::key(&address.to_string()),
        resource.id().unwrap_or_default()
    ));
    let declared = match &manifest {
        Some(m) => m.resources()?.contains_key(&address),
        None => false,
    };
    if !declared {
        output::hint("declare it in the manifest or the next apply will delete it");
    }
    Ok(())
}
