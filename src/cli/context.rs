//! Paths and handles shared by every command.

use std::path::PathBuf;
use tracing::debug;

use crate::core::backend::OpCli;
use crate::core::config::Settings;
use crate::core::manifest::Manifest;
use crate::core::state::State;
use crate::error::Result;

/// Where the manifest and state live for this invocation.
#[derive(Debug, Clone)]
pub struct Context {
    manifest: PathBuf,
    state: PathBuf,
}

impl Context {
    pub fn new(manifest: PathBuf, state: PathBuf) -> Self {
        Self { manifest, state }
    }

    pub fn manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest)
    }

    /// The manifest, for commands that also work without one.
    pub fn optional_manifest(&self) -> Result<Option<Manifest>> {
        if self.manifest.exists() {
            self.manifest().map(Some)
        } else {
            debug!(path = %self.manifest.display(), "no manifest, using default settings");
            Ok(None)
        }
    }

    pub fn state(&self) -> Result<State> {
        State::load(&self.state)
    }

    pub fn save(&self, state: &mut State) -> Result<()> {
        state.save(&self.state)
    }

    /// The `op` backend for the given settings, with environment overrides.
    pub fn backend(&self, settings: Option<&Settings>) -> Result<OpCli> {
        let settings = settings.cloned().unwrap_or_default().with_env();
        settings.validate()?;
        Ok(OpCli::from_settings(&settings))
    }
}
