//! Test support utilities for opsync integration tests.
//!
//! Provides an isolated project directory and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::path::PathBuf;
use tempfile::TempDir;

/// A manifest with one vault and both kinds of membership.
pub const MANIFEST: &str = r#"
[vault.engineering]
name = "Engineering"
safety_lock = true

[group_vault.eng_admins]
group = "grp1"
vault = "vault.engineering"

[vault_member.alice_eng]
vault = "vault.engineering"
user = "USER1"
"#;

/// State matching [`MANIFEST`] after a successful apply.
pub const STATE: &str = r#"{
  "version": 1,
  "serial": 4,
  "resources": {
    "vault.engineering": {
      "id": "vlt1",
      "attributes": { "name": "Engineering", "safety_lock": true, "incognito": false }
    },
    "group_vault.eng_admins": {
      "id": "grp1-vlt1",
      "attributes": { "group": "grp1", "vault": "vlt1" }
    },
    "vault_member.alice_eng": {
      "id": "vlt1-user1",
      "attributes": { "vault": "vlt1", "user": "USER1" }
    }
  }
}"#;

/// Test environment with an isolated project directory.
///
/// Child processes run with `.current_dir()`, so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// A project with `opsync.toml` written.
    pub fn with_manifest(contents: &str) -> Self {
        let t = Self::new();
        t.write_manifest(contents);
        t
    }

    /// A project with both manifest and state written.
    pub fn applied() -> Self {
        let t = Self::with_manifest(MANIFEST);
        t.write_state(STATE);
        t
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write_manifest(&self, contents: &str) {
        std::fs::write(self.path("opsync.toml"), contents).expect("failed to write manifest");
    }

    pub fn write_state(&self, contents: &str) {
        let path = self.state_path();
        std::fs::create_dir_all(path.parent().expect("state path has a parent"))
            .expect("failed to create state dir");
        std::fs::write(path, contents).expect("failed to write state");
    }

    pub fn state_path(&self) -> PathBuf {
        self.path(".opsync/state.json")
    }

    /// Parsed state file.
    pub fn state_json(&self) -> serde_json::Value {
        let contents = std::fs::read_to_string(self.state_path()).expect("failed to read state");
        serde_json::from_str(&contents).expect("state is not valid JSON")
    }
}
