//! Backend abstraction.
//!
//! The secret-management backend is only reachable through an opaque,
//! side-effecting command interface. Controllers never talk to it directly;
//! they receive a `&dyn Backend` (or any `B: Backend`) for every operation.
//!
//! ## Implementations
//!
//! - [`OpCli`]: shells out to the 1Password `op` CLI
//! - [`MemoryBackend`]: in-process backend with call recording, used by tests

use serde::Deserialize;

use crate::core::relation::Relation;
use crate::error::Result;

pub mod memory;
pub mod op;

pub use memory::MemoryBackend;
pub use op::OpCli;

/// A vault as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VaultRecord {
    #[serde(alias = "uuid")]
    pub id: String,
    pub name: String,
}

/// One entry of a member list (a user of a vault, or a vault of a group).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberRecord {
    #[serde(alias = "uuid")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl MemberRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
        }
    }
}

/// Backend collaborator contract.
///
/// Every method is one blocking round trip. Errors are returned verbatim;
/// there is no retry at this layer.
pub trait Backend {
    /// The acting account, if known. Used by incognito vault creation.
    fn principal(&self) -> Option<&str>;

    /// Fetch a vault by id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the vault does not exist.
    fn read_vault(&self, id: &str) -> Result<VaultRecord>;

    /// Create a vault and return the backend's record of it.
    fn create_vault(&self, name: &str) -> Result<VaultRecord>;

    /// Rename a vault.
    fn update_vault(&self, id: &str, name: &str) -> Result<()>;

    /// Delete a vault.
    fn delete_vault(&self, id: &str) -> Result<()>;

    /// List every member of `parent` for the given relation.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::MissingParent` if `parent` is empty.
    fn list_members(&self, relation: Relation, parent: &str) -> Result<Vec<MemberRecord>>;

    /// Add `member` to `parent`. Note the member-first argument order.
    fn add_member(&self, relation: Relation, member: &str, parent: &str) -> Result<()>;

    /// Remove `member` from `parent`. Note the parent-first argument order,
    /// the reverse of [`Backend::add_member`].
    fn remove_member(&self, relation: Relation, parent: &str, member: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_record_accepts_uuid_field() {
        let record: VaultRecord =
            serde_json::from_str(r#"{"uuid":"abc123","name":"Engineering"}"#).unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.name, "Engineering");
    }

    #[test]
    fn test_vault_record_accepts_id_field() {
        let record: VaultRecord =
            serde_json::from_str(r#"{"id":"abc123","name":"Ops","type":"USER_CREATED"}"#)
                .unwrap();
        assert_eq!(record.id, "abc123");
    }

    #[test]
    fn test_member_list_ignores_extra_fields() {
        let members: Vec<MemberRecord> = serde_json::from_str(
            r#"[{"uuid":"U1","email":"a@example.com","firstName":"A","state":"A"},
                {"uuid":"U2"}]"#,
        )
        .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].email.as_deref(), Some("a@example.com"));
        assert_eq!(members[1], MemberRecord::new("U2"));
    }
}
