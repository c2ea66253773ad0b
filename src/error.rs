//! Error types.
//!
//! Every layer has its own `thiserror` enum; they all convert into the
//! top-level [`Error`] through `#[from]` so callers can use `?` freely.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for all opsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Delete refused because the vault carries `safety_lock = true`.
    #[error("vault {id} is protected by safety_lock")]
    Protected { id: String },

    /// The vault was created but removing the acting principal failed.
    #[error("vault {vault} was created but removing {principal} from it failed: {source}")]
    IncognitoCleanup {
        vault: String,
        principal: String,
        #[source]
        source: Box<Error>,
    },

    /// Incognito creation needs to know who the acting account is.
    #[error("incognito creation requires an acting principal (settings.email or OPSYNC_EMAIL)")]
    NoPrincipal,

    #[error("{address} was not found in the backend (id {id})")]
    ImportNotFound { address: String, id: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Apply needs confirmation but there is no terminal to ask on.
    #[error("refusing to prompt without a terminal")]
    NotInteractive,

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Composite identifier errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{kind} has no stored id")]
    Missing { kind: &'static str },

    #[error("improperly formatted {kind} id '{id}': the format \"{format}\" is expected")]
    Malformed {
        kind: &'static str,
        format: &'static str,
        id: String,
    },
}

/// Failures reported by (or while talking to) the backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("must provide an identifier to list members")]
    MissingParent,

    #[error("op CLI not found at '{0}'")]
    CliNotFound(String),

    #[error("failed to spawn op: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to decode op output: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Manifest and settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read manifest: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{address} references {target}, which is not declared in the manifest")]
    UnknownReference { address: String, target: String },
}

/// State file errors.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("unsupported state version {0}")]
    Version(u32),

    #[error("invalid address '{0}': expected <vault|group_vault|vault_member>.<name>")]
    InvalidAddress(String),

    #[error("no resource at {0} in state")]
    UnknownAddress(String),

    #[error("{0} already exists in state")]
    AlreadyManaged(String),

    #[error("{address} is missing attribute '{attribute}'")]
    MissingAttribute {
        address: String,
        attribute: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
