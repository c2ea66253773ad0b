//! Plan command.
//!
//! Refreshes stored resources, diffs the manifest against them and prints
//! the result. Nothing is written.

use tracing::debug;

use crate::cli::{output, Context};
use crate::core::plan::{self, Plan};
use crate::core::reconcile;
use crate::error::Result;

pub fn execute(ctx: &Context, no_refresh: bool) -> Result<()> {
    let manifest = ctx.manifest()?;
    let mut state = ctx.state()?;

    if no_refresh {
        debug!("skipping refresh");
    } else {
        let backend = ctx.backend(Some(&manifest.settings))?;
        reconcile::refresh(&backend, &mut state)?;
    }

    let plan = plan::compute(&manifest, &state)?;
    render(&plan);
    if plan.has_changes() {
        output::hint("run: opsync apply");
    }
    Ok(())
}

/// Print a plan, or a one-line notice when there is nothing to do.
pub fn render(plan: &Plan) {
    if !plan.has_changes() {
        output::success("no changes, the account matches the manifest");
        return;
    }

    output::section("Plan");
    for change in plan.pending() {
        output::change(change.action, &change.address.to_string());
        for detail in &change.details {
            output::detail(detail);
        }
    }
    output::rule();

    let tally = plan::tally(plan);
    println!(
        "{} to create, {} to update, {} to replace, {} to delete",
        tally["create"], tally["update"], tally["replace"], tally["delete"]
    );
}
