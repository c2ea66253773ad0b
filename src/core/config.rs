//! Backend settings.
//!
//! Read from the `[settings]` table of the manifest, then overridden by
//! `OPSYNC_OP`, `OPSYNC_ACCOUNT` and `OPSYNC_EMAIL`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// How to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Path or name of the `op` binary.
    #[serde(default = "default_op")]
    pub op: String,
    /// Account shorthand passed as `--account`.
    #[serde(default)]
    pub account: Option<String>,
    /// Email of the signed-in user; required for incognito vaults.
    #[serde(default)]
    pub email: Option<String>,
}

fn default_op() -> String {
    constants::OP_BIN.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            op: default_op(),
            account: None,
            email: None,
        }
    }
}

impl Settings {
    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(op) = var(constants::ENV_OP).filter(|v| !v.is_empty()) {
            debug!(op = %op, "op binary overridden from environment");
            self.op = op;
        }
        if let Some(account) = var(constants::ENV_ACCOUNT).filter(|v| !v.is_empty()) {
            self.account = Some(account);
        }
        if let Some(email) = var(constants::ENV_EMAIL).filter(|v| !v.is_empty()) {
            self.email = Some(email);
        }
        self
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty binary name, account
    /// or email.
    pub fn validate(&self) -> Result<()> {
        if self.op.trim().is_empty() {
            return Err(invalid("settings.op", "must not be empty"));
        }
        if matches!(self.account.as_deref(), Some(a) if a.trim().is_empty()) {
            return Err(invalid("settings.account", "must not be empty when set"));
        }
        if let Some(email) = self.email.as_deref() {
            if !email.contains('@') {
                return Err(invalid(
                    "settings.email",
                    &format!("'{}' is not an email address", email),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
