//! Command-line interface.

pub mod apply;
pub mod completions;
pub mod context;
pub mod import;
pub mod output;
pub mod plan;
pub mod refresh;
pub mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::constants::{MANIFEST_FILE, STATE_FILE};

pub use context::Context;

/// opsync - declarative 1Password vaults and memberships.
#[derive(Parser)]
#[command(
    name = "opsync",
    about = "Declarative 1Password vaults, group grants and vault members",
    version
)]
pub struct Cli {
    /// Path to the manifest
    #[arg(long, global = true, default_value = MANIFEST_FILE)]
    pub manifest: PathBuf,

    /// Path to the state file
    #[arg(long, global = true, default_value = STATE_FILE)]
    pub state: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan {
        /// Plan against stored state without reading the backend first
        #[arg(long)]
        no_refresh: bool,
    },

    /// Bring the account in line with the manifest
    Apply {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Re-read every stored resource from the backend
    Refresh,

    /// Start managing an existing resource
    Import {
        /// Resource address (e.g., vault.engineering, vault_member.alice)
        address: String,
        /// Backend id; for memberships the composite id (e.g., vaultid-userid)
        id: String,
    },

    /// Inspect or edit the state file
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// State subcommands.
#[derive(Subcommand)]
pub enum StateAction {
    /// List managed resources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one stored resource
    Show {
        /// Resource address
        address: String,
    },

    /// Forget a resource without touching the backend
    Rm {
        /// Resource address
        address: String,
    },
}

/// Execute a command.
pub fn execute(cli: Cli) -> crate::error::Result<()> {
    use Command::*;

    let ctx = Context::new(cli.manifest, cli.state);
    match cli.command {
        Plan { no_refresh } => plan::execute(&ctx, no_refresh),
        Apply { yes } => apply::execute(&ctx, yes),
        Refresh => refresh::execute(&ctx),
        Import { address, id } => import::execute(&ctx, &address, &id),
        State { action } => match action {
            StateAction::List { json } => state::list(&ctx, json),
            StateAction::Show { address } => state::show(&ctx, &address),
            StateAction::Rm { address } => state::rm(&ctx, &address),
        },
        Completions { shell } => completions::execute(shell),
    }
}
