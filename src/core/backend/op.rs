//! 1Password CLI backend.
//!
//! Drives the `op` binary as a subprocess and decodes its JSON output.
//!
//! ## Requirements
//!
//! - `op` must be installed and on `PATH` (or configured via `settings.op`)
//! - a signed-in session must already exist; opsync never prompts
//!
//! ## Command mapping
//!
//! ```text
//! read_vault       op get vault <id>
//! create_vault     op create vault <name>
//! update_vault     op edit vault <id> --name=<name>
//! delete_vault     op delete vault <id>
//! list_members     op list users --vault <vault>     (vault members)
//!                  op list vaults --group <group>    (group vaults)
//! add_member       op add user <user> <vault>
//!                  op add group <group> <vault>
//! remove_member    op remove user <user> <vault>
//!                  op remove group <group> <vault>
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

use super::{Backend, MemberRecord, VaultRecord};
use crate::core::config::Settings;
use crate::core::relation::Relation;
use crate::error::{BackendError, Result};

const VAULT: &str = "vault";

/// Backend that shells out to the `op` CLI.
#[derive(Debug, Clone)]
pub struct OpCli {
    bin: String,
    account: Option<String>,
    principal: Option<String>,
}

impl OpCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            account: None,
            principal: None,
        }
    }

    /// Pass `--account <shorthand>` to every invocation.
    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    /// Set the acting principal (the signed-in user's email).
    pub fn with_principal(mut self, principal: Option<String>) -> Self {
        self.principal = principal;
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.op.clone())
            .with_account(settings.account.clone())
            .with_principal(settings.email.clone())
    }

    fn locate(&self) -> Result<PathBuf> {
        which::which(&self.bin).map_err(|_| BackendError::CliNotFound(self.bin.clone()).into())
    }

    fn run_cmd(&self, command: OpCommand<'_>) -> Result<Vec<u8>> {
        let path = self.locate()?;
        let args = command.args();
        let rendered = format!("op {}", args.join(" "));
        debug!(command = %rendered, "running op");

        let mut cmd = Command::new(path);
        cmd.args(&args);
        if let Some(account) = &self.account {
            cmd.args(["--account", account.as_str()]);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().map_err(BackendError::Spawn)?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit {}", c));
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify(rendered, status, stderr).into());
        }

        trace!(bytes = output.stdout.len(), "op finished");
        Ok(output.stdout)
    }
}

impl Backend for OpCli {
    fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    fn read_vault(&self, id: &str) -> Result<VaultRecord> {
        let out = self.run_cmd(OpCommand::GetVault { id })?;
        Ok(serde_json::from_slice(&out).map_err(BackendError::Decode)?)
    }

    fn create_vault(&self, name: &str) -> Result<VaultRecord> {
        let out = self.run_cmd(OpCommand::CreateVault { name })?;
        Ok(serde_json::from_slice(&out).map_err(BackendError::Decode)?)
    }

    fn update_vault(&self, id: &str, name: &str) -> Result<()> {
        self.run_cmd(OpCommand::EditVault { id, name })?;
        Ok(())
    }

    fn delete_vault(&self, id: &str) -> Result<()> {
        self.run_cmd(OpCommand::DeleteVault { id })?;
        Ok(())
    }

    fn list_members(&self, relation: Relation, parent: &str) -> Result<Vec<MemberRecord>> {
        if parent.is_empty() {
            return Err(BackendError::MissingParent.into());
        }
        let out = self.run_cmd(OpCommand::ListMembers { relation, parent })?;
        // op prints nothing at all for an empty list on some versions
        if out.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&out).map_err(BackendError::Decode)?)
    }

    fn add_member(&self, relation: Relation, member: &str, parent: &str) -> Result<()> {
        self.run_cmd(OpCommand::AddMember {
            relation,
            member,
            parent,
        })?;
        Ok(())
    }

    fn remove_member(&self, relation: Relation, parent: &str, member: &str) -> Result<()> {
        self.run_cmd(OpCommand::RemoveMember {
            relation,
            parent,
            member,
        })?;
        Ok(())
    }
}

/// One `op` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpCommand<'a> {
    GetVault {
        id: &'a str,
    },
    CreateVault {
        name: &'a str,
    },
    EditVault {
        id: &'a str,
        name: &'a str,
    },
    DeleteVault {
        id: &'a str,
    },
    ListMembers {
        relation: Relation,
        parent: &'a str,
    },
    AddMember {
        relation: Relation,
        member: &'a str,
        parent: &'a str,
    },
    RemoveMember {
        relation: Relation,
        parent: &'a str,
        member: &'a str,
    },
}

impl OpCommand<'_> {
    fn args(&self) -> Vec<String> {
        let v = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match *self {
            OpCommand::GetVault { id } => v(&["get", VAULT, id]),
            OpCommand::CreateVault { name } => v(&["create", VAULT, name]),
            OpCommand::EditVault { id, name } => {
                let flag = format!("--name={}", name);
                v(&["edit", VAULT, id, flag.as_str()])
            }
            OpCommand::DeleteVault { id } => v(&["delete", VAULT, id]),
            OpCommand::ListMembers { relation, parent } => match relation {
                Relation::VaultMember => v(&["list", "users", "--vault", parent]),
                Relation::GroupVault => v(&["list", "vaults", "--group", parent]),
            },
            // the user-facing op syntax always names the user or group first
            OpCommand::AddMember {
                relation,
                member,
                parent,
            } => match relation {
                Relation::VaultMember => v(&["add", "user", member, parent]),
                Relation::GroupVault => v(&["add", "group", parent, member]),
            },
            OpCommand::RemoveMember {
                relation,
                parent,
                member,
            } => match relation {
                Relation::VaultMember => v(&["remove", "user", member, parent]),
                Relation::GroupVault => v(&["remove", "group", parent, member]),
            },
        }
    }
}

/// Map a failed invocation to a backend error.
fn classify(command: String, status: String, stderr: String) -> BackendError {
    let lower = stderr.to_lowercase();
    let missing = ["not found", "doesn't seem to be", "isn't a", "no vault"]
        .iter()
        .any(|needle| lower.contains(needle));

    if missing {
        BackendError::NotFound(stderr)
    } else {
        BackendError::Failed {
            command,
            status,
            stderr,
        }
    }
}
