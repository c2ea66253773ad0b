//! Desired-state manifest (`opsync.toml`).
//!
//! ```toml
//! [settings]
//! email = "me@example.com"
//!
//! [vault.engineering]
//! name = "Engineering"
//! safety_lock = true
//!
//! [group_vault.eng_admins]
//! group = "kf2nsfr4fjb4zgwdkzwxpu4bxa"
//! vault = "vault.engineering"
//!
//! [vault_member.alice_eng]
//! vault = "vault.engineering"
//! user = "WQDLF6VUHNG5DOLQOKKKPBS4GQ"
//! ```
//!
//! A `vault` value of the form `vault.<name>` refers to a vault declared in
//! the same manifest; anything else is taken as a literal backend id.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::address::{Address, Kind};
use crate::core::config::Settings;
use crate::core::constants::{ID_SEPARATOR, VAULT_REF_PREFIX};
use crate::core::relation::Relation;
use crate::core::types::ResourceName;
use crate::error::{ConfigError, Result};

/// Parsed manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub vault: BTreeMap<ResourceName, VaultSpec>,
    #[serde(default)]
    pub group_vault: BTreeMap<ResourceName, GroupVaultSpec>,
    #[serde(default)]
    pub vault_member: BTreeMap<ResourceName, VaultMemberSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultSpec {
    pub name: String,
    #[serde(default)]
    pub safety_lock: bool,
    #[serde(default)]
    pub incognito: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupVaultSpec {
    pub group: String,
    pub vault: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultMemberSpec {
    pub vault: String,
    pub user: String,
}

/// One side of a relationship as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A literal backend id.
    Id(String),
    /// A vault managed by this manifest, by resource name.
    Vault(ResourceName),
}

impl Target {
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(VAULT_REF_PREFIX) {
            Some(name) => Target::Vault(name.to_string()),
            None => Target::Id(value.to_string()),
        }
    }
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Desired {
    Vault(VaultSpec),
    Membership {
        relation: Relation,
        parent: Target,
        member: Target,
    },
}

impl Manifest {
    /// Load and validate a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file is missing, `Parse` for
    /// malformed TOML, or a validation error.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading manifest");
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let manifest = Self::parse(&contents)?;
        debug!(
            vaults = manifest.vault.len(),
            group_vaults = manifest.group_vault.len(),
            vault_members = manifest.vault_member.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text.
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate names, ids and references.
    ///
    /// Relationship ids must not contain the composite-id separator, since
    /// such an id could never be read back.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        for (name, spec) in &self.vault {
            let address = Address::new(Kind::Vault, name)?;
            if spec.name.trim().is_empty() {
                return Err(invalid(&address, "name", "must not be empty".into()));
            }
        }

        for (address, desired) in self.resources()? {
            let Desired::Membership {
                relation,
                parent,
                member,
            } = desired
            else {
                continue;
            };
            for (attr, target) in [
                (relation.parent_attr(), parent),
                (relation.member_attr(), member),
            ] {
                match target {
                    Target::Id(id) => check_id(&address, attr, &id)?,
                    Target::Vault(name) if !self.vault.contains_key(&name) => {
                        return Err(ConfigError::UnknownReference {
                            address: address.to_string(),
                            target: format!("{}{}", VAULT_REF_PREFIX, name),
                        }
                        .into());
                    }
                    Target::Vault(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Every declared resource, keyed by address.
    pub fn resources(&self) -> Result<BTreeMap<Address, Desired>> {
        let mut out = BTreeMap::new();
        for (name, spec) in &self.vault {
            out.insert(Address::new(Kind::Vault, name)?, Desired::Vault(spec.clone()));
        }
        for (name, spec) in &self.group_vault {
            out.insert(
                Address::new(Kind::GroupVault, name)?,
                Desired::Membership {
                    relation: Relation::GroupVault,
                    parent: Target::Id(spec.group.clone()),
                    member: Target::parse(&spec.vault),
                },
            );
        }
        for (name, spec) in &self.vault_member {
            out.insert(
                Address::new(Kind::VaultMember, name)?,
                Desired::Membership {
                    relation: Relation::VaultMember,
                    parent: Target::parse(&spec.vault),
                    member: Target::Id(spec.user.clone()),
                },
            );
        }
        Ok(out)
    }

    /// The declared spec of a vault, if any.
    pub fn vault_spec(&self, name: &str) -> Option<&VaultSpec> {
        self.vault.get(name)
    }
}

fn check_id(address: &Address, attr: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(invalid(address, attr, "must not be empty".into()));
    }
    if id.contains(ID_SEPARATOR) {
        return Err(invalid(
            address,
            attr,
            format!("'{}' contains '{}', which is reserved", id, ID_SEPARATOR),
        ));
    }
    Ok(())
}

fn invalid(address: &Address, attr: &str, reason: String) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: format!("{}.{}", address, attr),
        reason,
    }
    .into()
}
