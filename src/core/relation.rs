//! Relationship kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::id::Codec;

/// The two membership relations opsync manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// A group granted access to a vault. Parent: group, member: vault.
    GroupVault,
    /// A user granted access to a vault. Parent: vault, member: user.
    VaultMember,
}

impl Relation {
    pub fn codec(self) -> Codec {
        match self {
            Relation::GroupVault => Codec::GROUP_VAULT,
            Relation::VaultMember => Codec::VAULT_MEMBER,
        }
    }

    /// Attribute name of the parent half.
    pub fn parent_attr(self) -> &'static str {
        match self {
            Relation::GroupVault => "group",
            Relation::VaultMember => "vault",
        }
    }

    /// Attribute name of the member half.
    pub fn member_attr(self) -> &'static str {
        match self {
            Relation::GroupVault => "vault",
            Relation::VaultMember => "user",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::GroupVault => "group_vault",
            Relation::VaultMember => "vault_member",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
