//! Resource addresses.
//!
//! Every managed resource is keyed by `<kind>.<name>`, e.g.
//! `vault.engineering` or `vault_member.alice_eng`. The same address is used
//! in the manifest and in the state file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::relation::Relation;
use crate::error::StateError;

/// Resource kinds, in the order they are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Vault,
    GroupVault,
    VaultMember,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Vault => "vault",
            Kind::GroupVault => "group_vault",
            Kind::VaultMember => "vault_member",
        }
    }

    /// The relation managed by this kind, if it is a relationship.
    pub fn relation(self) -> Option<Relation> {
        match self {
            Kind::Vault => None,
            Kind::GroupVault => Some(Relation::GroupVault),
            Kind::VaultMember => Some(Relation::VaultMember),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "vault" => Some(Kind::Vault),
            "group_vault" => Some(Kind::GroupVault),
            "vault_member" => Some(Kind::VaultMember),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<kind>.<name>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    kind: Kind,
    name: String,
}

impl Address {
    /// Build an address, validating the name.
    pub fn new(kind: Kind, name: &str) -> Result<Self, StateError> {
        if !valid_name(name) {
            return Err(StateError::InvalidAddress(format!("{}.{}", kind, name)));
        }
        Ok(Self {
            kind,
            name: name.to_string(),
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for Address {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once('.')
            .ok_or_else(|| StateError::InvalidAddress(s.to_string()))?;
        let kind = Kind::parse(kind).ok_or_else(|| StateError::InvalidAddress(s.to_string()))?;
        Address::new(kind, name).map_err(|_| StateError::InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = StateError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let address: Address = "vault_member.alice_eng".parse().unwrap();
        assert_eq!(address.kind(), Kind::VaultMember);
        assert_eq!(address.name(), "alice_eng");
        assert_eq!(address.to_string(), "vault_member.alice_eng");
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!("item.login".parse::<Address>().is_err());
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!("vault.".parse::<Address>().is_err());
        assert!("vault".parse::<Address>().is_err());
        assert!("vault.a.b".parse::<Address>().is_err());
        assert!("vault.has space".parse::<Address>().is_err());
    }

    #[test]
    fn test_vaults_sort_before_relationships() {
        let mut addresses: Vec<Address> = ["vault_member.a", "group_vault.b", "vault.c"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        addresses.sort();
        assert_eq!(addresses[0].kind(), Kind::Vault);
        assert_eq!(addresses[2].kind(), Kind::VaultMember);
    }
}
