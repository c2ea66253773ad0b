//! In-memory backend.
//!
//! Models the parts of the 1Password account opsync touches: vaults, their
//! users, and the vaults each group can access. Every call is recorded so
//! tests can assert on what was (or was not) sent to the backend, and any
//! operation can be made to fail.
//!
//! Canonical casing follows the real service: user ids are listed uppercase,
//! vault ids lowercase.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{Backend, MemberRecord, VaultRecord};
use crate::core::relation::Relation;
use crate::error::{BackendError, Result};

/// Backend operations, for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    ReadVault,
    CreateVault,
    UpdateVault,
    DeleteVault,
    ListMembers,
    AddMember,
    RemoveMember,
}

/// A recorded backend call, arguments in the order they were passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    vaults: BTreeMap<String, String>,
    vault_users: BTreeMap<String, Vec<String>>,
    group_vaults: BTreeMap<String, Vec<String>>,
    next_id: u64,
    calls: Vec<Call>,
    failures: BTreeMap<Op, String>,
}

/// Deterministic in-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    principal: Option<String>,
    strict_removal: bool,
    inner: RefCell<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acting principal. New vaults get it as their first member.
    pub fn with_principal(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_string());
        self
    }

    /// Reject removal of a member that is not present, instead of ignoring it.
    pub fn strict_removal(mut self) -> Self {
        self.strict_removal = true;
        self
    }

    /// Register a group so it can be granted vaults.
    pub fn with_group(self, group: &str) -> Self {
        self.inner
            .borrow_mut()
            .group_vaults
            .entry(key(group))
            .or_default();
        self
    }

    /// Seed a vault created outside opsync.
    pub fn insert_vault(&self, id: &str, name: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.vaults.insert(key(id), name.to_string());
        inner.vault_users.entry(key(id)).or_default();
    }

    /// Seed or externally change a membership without recording a call.
    pub fn insert_member(&self, relation: Relation, parent: &str, member: &str) {
        let mut inner = self.inner.borrow_mut();
        let list = inner.list_mut(relation, parent);
        let member = canonical(relation, member);
        if !list.contains(&member) {
            list.push(member);
        }
    }

    /// Externally remove a membership without recording a call.
    pub fn drop_member(&self, relation: Relation, parent: &str, member: &str) {
        let mut inner = self.inner.borrow_mut();
        let member = canonical(relation, member);
        inner.list_mut(relation, parent).retain(|m| *m != member);
    }

    /// Externally delete a vault without recording a call.
    pub fn drop_vault(&self, id: &str) {
        self.inner.borrow_mut().remove_vault(id);
    }

    /// Make every subsequent call of `op` fail with `message`.
    pub fn fail(&self, op: Op, message: &str) {
        self.inner
            .borrow_mut()
            .failures
            .insert(op, message.to_string());
    }

    pub fn vault_name(&self, id: &str) -> Option<String> {
        self.inner.borrow().vaults.get(&key(id)).cloned()
    }

    pub fn vault_count(&self) -> usize {
        self.inner.borrow().vaults.len()
    }

    /// Current member ids of `parent`, in canonical casing.
    pub fn members(&self, relation: Relation, parent: &str) -> Vec<String> {
        let inner = self.inner.borrow();
        let map = match relation {
            Relation::VaultMember => &inner.vault_users,
            Relation::GroupVault => &inner.group_vaults,
        };
        map.get(&key(parent)).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    /// Calls of one kind, in order.
    pub fn calls_to(&self, op: Op) -> Vec<Call> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .cloned()
            .collect()
    }

    fn record(&self, op: Op, args: &[&str]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call {
            op,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        match inner.failures.get(&op) {
            Some(message) => Err(BackendError::Failed {
                command: format!("{:?}", op),
                status: "exit 1".to_string(),
                stderr: message.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl Inner {
    fn list_mut(&mut self, relation: Relation, parent: &str) -> &mut Vec<String> {
        let map = match relation {
            Relation::VaultMember => &mut self.vault_users,
            Relation::GroupVault => &mut self.group_vaults,
        };
        map.entry(key(parent)).or_default()
    }

    fn parent_exists(&self, relation: Relation, parent: &str) -> bool {
        match relation {
            Relation::VaultMember => self.vaults.contains_key(&key(parent)),
            Relation::GroupVault => self.group_vaults.contains_key(&key(parent)),
        }
    }

    fn remove_vault(&mut self, id: &str) {
        let id = key(id);
        self.vaults.remove(&id);
        self.vault_users.remove(&id);
        for vaults in self.group_vaults.values_mut() {
            vaults.retain(|v| *v != id);
        }
    }
}

/// Parent ids are matched case-insensitively, like the real service.
fn key(id: &str) -> String {
    id.to_lowercase()
}

fn canonical(relation: Relation, member: &str) -> String {
    relation.codec().member_case().apply(member)
}

fn not_found(what: &str, id: &str) -> crate::error::Error {
    BackendError::NotFound(format!("{} \"{}\" not found", what, id)).into()
}

impl Backend for MemoryBackend {
    fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    fn read_vault(&self, id: &str) -> Result<VaultRecord> {
        self.record(Op::ReadVault, &[id])?;
        let inner = self.inner.borrow();
        inner
            .vaults
            .get(&key(id))
            .map(|name| VaultRecord {
                id: key(id),
                name: name.clone(),
            })
            .ok_or_else(|| not_found("vault", id))
    }

    fn create_vault(&self, name: &str) -> Result<VaultRecord> {
        self.record(Op::CreateVault, &[name])?;
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = format!("vlt{:023}", inner.next_id);
        inner.vaults.insert(id.clone(), name.to_string());
        let creator = self.principal.iter().map(|p| p.to_uppercase()).collect();
        inner.vault_users.insert(id.clone(), creator);
        Ok(VaultRecord {
            id,
            name: name.to_string(),
        })
    }

    fn update_vault(&self, id: &str, name: &str) -> Result<()> {
        self.record(Op::UpdateVault, &[id, name])?;
        let mut inner = self.inner.borrow_mut();
        match inner.vaults.get_mut(&key(id)) {
            Some(current) => {
                *current = name.to_string();
                Ok(())
            }
            None => Err(not_found("vault", id)),
        }
    }

    fn delete_vault(&self, id: &str) -> Result<()> {
        self.record(Op::DeleteVault, &[id])?;
        let mut inner = self.inner.borrow_mut();
        if !inner.vaults.contains_key(&key(id)) {
            return Err(not_found("vault", id));
        }
        inner.remove_vault(id);
        Ok(())
    }

    fn list_members(&self, relation: Relation, parent: &str) -> Result<Vec<MemberRecord>> {
        self.record(Op::ListMembers, &[relation.as_str(), parent])?;
        if parent.is_empty() {
            return Err(BackendError::MissingParent.into());
        }
        let inner = self.inner.borrow();
        if !inner.parent_exists(relation, parent) {
            return Err(not_found(relation.parent_attr(), parent));
        }
        Ok(self
            .members(relation, parent)
            .into_iter()
            .map(MemberRecord::new)
            .collect())
    }

    fn add_member(&self, relation: Relation, member: &str, parent: &str) -> Result<()> {
        self.record(Op::AddMember, &[relation.as_str(), member, parent])?;
        let mut inner = self.inner.borrow_mut();
        if !inner.parent_exists(relation, parent) {
            return Err(not_found(relation.parent_attr(), parent));
        }
        if relation == Relation::GroupVault && !inner.vaults.contains_key(&key(member)) {
            return Err(not_found("vault", member));
        }
        let member = canonical(relation, member);
        let list = inner.list_mut(relation, parent);
        if !list.contains(&member) {
            list.push(member);
        }
        Ok(())
    }

    fn remove_member(&self, relation: Relation, parent: &str, member: &str) -> Result<()> {
        self.record(Op::RemoveMember, &[relation.as_str(), parent, member])?;
        let mut inner = self.inner.borrow_mut();
        if !inner.parent_exists(relation, parent) {
            return Err(not_found(relation.parent_attr(), parent));
        }
        let member = canonical(relation, member);
        let list = inner.list_mut(relation, parent);
        let before = list.len();
        list.retain(|m| *m != member);
        if list.len() == before && self.strict_removal {
            return Err(BackendError::Failed {
                command: format!("{:?}", Op::RemoveMember),
                status: "exit 1".to_string(),
                stderr: format!("{} is not a member of {}", member, parent),
            }
            .into());
        }
        Ok(())
    }
}
