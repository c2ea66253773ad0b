//! Resource controllers.
//!
//! A controller turns one resource's stored data into backend calls and
//! writes the observed result back. Stored data is plain values; the backend
//! handle is passed into every operation.
//!
//! An `id` of `None` means "this resource does not exist". Read clears it
//! when the backend no longer has the resource, which tells the planner to
//! create it again.

pub mod membership;
pub mod vault;

use crate::core::backend::Backend;
use crate::core::relation::Relation;
use crate::core::types::ResourceId;
use crate::error::Result;

/// Stored state of a vault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultData {
    pub id: Option<ResourceId>,
    pub name: String,
    /// Client-side only; never sent to the backend.
    pub safety_lock: bool,
    /// Only consulted on create.
    pub incognito: bool,
}

impl VaultData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Data for importing an existing vault: only the id is known.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

/// Stored state of a group-vault grant or a vault membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipData {
    pub relation: Relation,
    /// Composite id, see [`crate::core::id::Codec`].
    pub id: Option<ResourceId>,
    pub parent: String,
    pub member: String,
}

impl MembershipData {
    pub fn new(relation: Relation, parent: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            relation,
            id: None,
            parent: parent.into(),
            member: member.into(),
        }
    }

    /// Data for importing an existing membership by composite id.
    pub fn from_id(relation: Relation, id: impl Into<String>) -> Self {
        Self {
            relation,
            id: Some(id.into()),
            parent: String::new(),
            member: String::new(),
        }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

/// Either kind of resource, for code that handles both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Vault(VaultData),
    Membership(MembershipData),
}

impl Resource {
    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Vault(v) => v.id.as_deref(),
            Resource::Membership(m) => m.id.as_deref(),
        }
    }

    pub fn exists(&self) -> bool {
        self.id().is_some()
    }
}

/// Refresh any resource from the backend.
pub fn read<B: Backend + ?Sized>(backend: &B, resource: &mut Resource) -> Result<()> {
    match resource {
        Resource::Vault(data) => vault::read(backend, data),
        Resource::Membership(data) => membership::read(backend, data),
    }
}

/// Delete any resource.
pub fn delete<B: Backend + ?Sized>(backend: &B, resource: &mut Resource) -> Result<()> {
    match resource {
        Resource::Vault(data) => vault::delete(backend, data),
        Resource::Membership(data) => membership::delete(backend, data),
    }
}
