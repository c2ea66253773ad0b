//! opsync - declarative 1Password vaults and memberships.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsync::cli::output;
use opsync::cli::{execute, Cli};
use opsync::error::{BackendError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("OPSYNC_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("opsync=debug")
        } else {
            EnvFilter::new("opsync=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => {
                Some("create opsync.toml or pass --manifest <path>")
            }
            Error::Backend(BackendError::CliNotFound(_)) => {
                Some("install the 1Password CLI or set OPSYNC_OP")
            }
            Error::Backend(BackendError::NotFound(_)) => Some(
                "if a managed vault was deleted outside opsync, forget its memberships with: opsync state rm <address>",
            ),
            Error::Protected { .. } => Some("set safety_lock = false and apply again to delete"),
            Error::NoPrincipal => Some("set settings.email or OPSYNC_EMAIL"),
            Error::NotInteractive => Some("run: opsync apply --yes"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
