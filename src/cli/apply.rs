//! Apply command.

use dialoguer::Confirm;
use tracing::info;

use crate::cli::{output, plan as show, Context};
use crate::core::plan;
use crate::core::reconcile;
use crate::error::{Error, Result};

/// Refresh, plan, confirm, then apply with a state save after every step.
pub fn execute(ctx: &Context, yes: bool) -> Result<()> {
    let manifest = ctx.manifest()?;
    let mut state = ctx.state()?;
    let backend = ctx.backend(Some(&manifest.settings))?;

    let before = state.resources.clone();
    let gone = reconcile::refresh(&backend, &mut state)?;
    for address in &gone {
        output::warn(&format!(
            "{} was removed outside opsync",
            output::key(&address.to_string())
        ));
    }
    if state.resources != before {
        ctx.save(&mut state)?;
    }

    let plan = plan::compute(&manifest, &state)?;
    show::render(&plan);
    if !plan.has_changes() {
        return Ok(());
    }

    if !yes && !confirm()? {
        output::hint("apply cancelled");
        return Ok(());
    }

    info!(changes = plan.pending().count(), "applying plan");
    let summary = reconcile::apply(&backend, &manifest, &mut state, &plan, |s| ctx.save(s))?;

    output::success(&format!(
        "apply complete: {} created, {} updated, {} replaced, {} deleted",
        summary.created, summary.updated, summary.replaced, summary.deleted
    ));
    Ok(())
}

fn confirm() -> Result<bool> {
    if !console::user_attended() {
        output::hint("pass --yes to apply without a terminal");
        return Err(Error::NotInteractive);
    }
    Confirm::new()
        .with_prompt("Apply these changes?")
        .default(false)
        .interact()
        .map_err(Into::into)
}
