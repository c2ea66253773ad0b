//! Constants used throughout opsync.
//!
//! Centralizes magic strings and configuration values.

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "opsync.toml";

/// Default state file location, relative to the working directory.
pub const STATE_FILE: &str = ".opsync/state.json";

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

/// Separator between the two halves of a composite identifier.
pub const ID_SEPARATOR: char = '-';

/// Default name of the 1Password CLI binary.
pub const OP_BIN: &str = "op";

/// Prefix that marks a manifest value as a reference to a managed vault.
pub const VAULT_REF_PREFIX: &str = "vault.";

/// Environment overrides for manifest settings.
pub const ENV_OP: &str = "OPSYNC_OP";
pub const ENV_ACCOUNT: &str = "OPSYNC_ACCOUNT";
pub const ENV_EMAIL: &str = "OPSYNC_EMAIL";
