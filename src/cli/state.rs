//! State subcommands.

use crate::cli::{output, Context};
use crate::core::address::Address;
use crate::core::state::Attr;
use crate::error::{Result, StateError};

/// List managed resources.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let state = ctx.state()?;

    if json {
        let resources: serde_json::Map<String, serde_json::Value> = state
            .resources
            .iter()
            .map(|(address, stored)| (address.to_string(), stored.id.clone().into()))
            .collect();
        let result = serde_json::json!({
            "serial": state.serial,
            "resources": resources,
        });
        let text = serde_json::to_string_pretty(&result).map_err(StateError::Serialize)?;
        output::data(&text);
    } else if state.resources.is_empty() {
        output::dimmed("no resources in state");
    } else {
        output::section(&format!("{} managed resources", state.resources.len()));
        for (address, stored) in &state.resources {
            output::kv(&address.to_string(), &stored.id);
        }
    }
    Ok(())
}

/// Show one stored resource with its attributes.
pub fn show(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let state = ctx.state()?;
    let stored = state
        .resources
        .get(&address)
        .ok_or_else(|| StateError::UnknownAddress(address.to_string()))?;

    output::section(&address.to_string());
    output::kv("id", &stored.id);
    for name in address.kind().attributes() {
        let value = match stored.attributes.get(*name) {
            Some(Attr::Str(s)) => s.clone(),
            Some(Attr::Bool(b)) => b.to_string(),
            None => "-".to_string(),
        };
        output::kv(name, value);
    }
    Ok(())
}

/// Remove a resource from state. The backend is left untouched.
pub fn rm(ctx: &Context, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let mut state = ctx.state()?;
    if state.remove(&address).is_none() {
        return Err(StateError::UnknownAddress(address.to_string()).into());
    }
    ctx.save(&mut state)?;

    output::success(&format!(
        "removed {} from state",
        output::key(&address.to_string())
    ));
    output::dimmed("the backend resource was not changed");
    Ok(())
}
