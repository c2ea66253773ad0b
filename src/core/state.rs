//! Persisted resource state (`.opsync/state.json`).
//!
//! Each managed resource is stored as one opaque id plus a fixed set of named
//! attributes for its kind:
//!
//! | kind           | attributes                          |
//! |----------------|-------------------------------------|
//! | `vault`        | `name`, `safety_lock`, `incognito`  |
//! | `group_vault`  | `group`, `vault`                    |
//! | `vault_member` | `vault`, `user`                     |
//!
//! A resource whose id was cleared is removed from state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::address::{Address, Kind};
use crate::core::constants::STATE_VERSION;
use crate::core::resource::{MembershipData, Resource, VaultData};
use crate::error::{Result, StateError};

/// A stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attr {
    Bool(bool),
    Str(String),
}

/// One stored resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResource {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attr>,
}

/// The whole state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    /// Incremented on every save.
    pub serial: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resources: BTreeMap<Address, StoredResource>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            updated_at: None,
            resources: BTreeMap::new(),
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state from `path`; a missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Read`, `Parse`, or `Version` for an unreadable,
    /// malformed or newer state file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let state: Self = serde_json::from_str(&contents).map_err(StateError::Parse)?;
        if state.version != STATE_VERSION {
            return Err(StateError::Version(state.version).into());
        }
        debug!(
            serial = state.serial,
            resources = state.resources.len(),
            "state loaded"
        );
        Ok(state)
    }

    /// Bump the serial and write the state atomically.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        self.updated_at = Some(Utc::now());

        let contents = serde_json::to_string_pretty(self).map_err(StateError::Serialize)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, path)?;

        debug!(serial = self.serial, path = %path.display(), "state saved");
        Ok(())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.resources.contains_key(address)
    }

    /// Stored id of a resource.
    pub fn id(&self, address: &Address) -> Option<&str> {
        self.resources.get(address).map(|r| r.id.as_str())
    }

    /// Decode a stored resource into controller data.
    pub fn get(&self, address: &Address) -> Result<Option<Resource>> {
        self.resources
            .get(address)
            .map(|stored| stored.decode(address))
            .transpose()
    }

    /// Store controller data; a resource without an id is removed.
    pub fn put(&mut self, address: &Address, resource: &Resource) {
        match StoredResource::encode(resource) {
            Some(stored) => {
                self.resources.insert(address.clone(), stored);
            }
            None => {
                self.resources.remove(address);
            }
        }
    }

    pub fn remove(&mut self, address: &Address) -> Option<StoredResource> {
        self.resources.remove(address)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.resources.keys().cloned().collect()
    }
}

impl StoredResource {
    fn encode(resource: &Resource) -> Option<Self> {
        match resource {
            Resource::Vault(v) => {
                let id = v.id.clone()?;
                let attributes = BTreeMap::from([
                    ("name".to_string(), Attr::Str(v.name.clone())),
                    ("safety_lock".to_string(), Attr::Bool(v.safety_lock)),
                    ("incognito".to_string(), Attr::Bool(v.incognito)),
                ]);
                Some(Self { id, attributes })
            }
            Resource::Membership(m) => {
                let id = m.id.clone()?;
                let attributes = BTreeMap::from([
                    (
                        m.relation.parent_attr().to_string(),
                        Attr::Str(m.parent.clone()),
                    ),
                    (
                        m.relation.member_attr().to_string(),
                        Attr::Str(m.member.clone()),
                    ),
                ]);
                Some(Self { id, attributes })
            }
        }
    }

    fn decode(&self, address: &Address) -> Result<Resource> {
        match address.kind().relation() {
            None => Ok(Resource::Vault(VaultData {
                id: Some(self.id.clone()),
                name: self.string(address, "name")?,
                safety_lock: self.flag("safety_lock"),
                incognito: self.flag("incognito"),
            })),
            Some(relation) => Ok(Resource::Membership(MembershipData {
                relation,
                id: Some(self.id.clone()),
                parent: self.string(address, relation.parent_attr())?,
                member: self.string(address, relation.member_attr())?,
            })),
        }
    }

    /// String attribute, for display.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(Attr::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn string(&self, address: &Address, attribute: &'static str) -> Result<String> {
        self.get_str(attribute)
            .map(str::to_string)
            .ok_or_else(|| {
                StateError::MissingAttribute {
                    address: address.to_string(),
                    attribute,
                }
                .into()
            })
    }

    fn flag(&self, attribute: &str) -> bool {
        matches!(self.attributes.get(attribute), Some(Attr::Bool(true)))
    }
}

impl Kind {
    /// Attribute names stored for this kind.
    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            Kind::Vault => &["name", "safety_lock", "incognito"],
            Kind::GroupVault => &["group", "vault"],
            Kind::VaultMember => &["vault", "user"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relation::Relation;
    use tempfile::TempDir;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let state = State::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state.serial, 0);
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".opsync").join("state.json");
        let mut state = State::new();
        state.put(
            &addr("vault.eng"),
            &Resource::Vault(VaultData {
                id: Some("vlt1".into()),
                name: "Engineering".into(),
                safety_lock: true,
                incognito: false,
            }),
        );
        state.put(
            &addr("vault_member.alice"),
            &Resource::Membership(MembershipData {
                relation: Relation::VaultMember,
                id: Some("vlt1-u1".into()),
                parent: "vlt1".into(),
                member: "U1".into(),
            }),
        );

        state.save(&path).unwrap();
        let loaded = State::load(&path).unwrap();

        assert_eq!(loaded.serial, 1);
        assert!(loaded.updated_at.is_some());
        assert_eq!(loaded.id(&addr("vault_member.alice")), Some("vlt1-u1"));
        let member = &loaded.resources[&addr("vault_member.alice")];
        assert_eq!(member.get_str("vault"), Some("vlt1"));
        assert_eq!(member.get_str("user"), Some("U1"));
        match loaded.get(&addr("vault.eng")).unwrap() {
            Some(Resource::Vault(v)) => assert!(v.safety_lock),
            other => panic!("unexpected resource: {:?}", other),
        }
    }

    #[test]
    fn test_put_without_id_removes() {
        let mut state = State::new();
        let address = addr("vault.eng");
        state.put(&address, &Resource::Vault(VaultData::from_id("vlt1")));
        assert!(state.contains(&address));

        state.put(&address, &Resource::Vault(VaultData::new("Engineering")));
        assert!(!state.contains(&address));
    }

    #[test]
    fn test_missing_attribute_is_reported() {
        let mut state = State::new();
        state.resources.insert(
            addr("group_vault.g"),
            StoredResource {
                id: "g1-v1".into(),
                attributes: BTreeMap::new(),
            },
        );
        let err = state.get(&addr("group_vault.g")).unwrap_err();
        assert!(err.to_string().contains("'group'"));
    }

    #[test]
    fn test_rejects_future_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"version": 99, "serial": 3, "resources": {}}"#).unwrap();
        let err = State::load(&path).unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_rejects_bad_address_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "serial": 1, "resources": {"item.x": {"id": "a"}}}"#,
        )
        .unwrap();
        assert!(State::load(&path).is_err());
    }
}
