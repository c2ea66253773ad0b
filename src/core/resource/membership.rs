//! Relationship controller.
//!
//! Memberships have no record of their own in the backend. Existence is
//! derived on every read by listing the parent's members, and identity is the
//! composite id built by the relation's codec.

use tracing::{debug, info};

use super::MembershipData;
use crate::core::backend::Backend;
use crate::core::lookup::{find_member, Lookup};
use crate::error::Result;

/// Refresh `data` from the backend.
///
/// Clears `data.id` if the member is no longer listed under the parent. When
/// present, the id is rebuilt from the canonical member id and both halves
/// are stored as observed.
///
/// # Errors
///
/// Returns `IdentityError::Malformed` for an unparseable id, or the backend
/// error if listing members fails.
pub fn read<B: Backend + ?Sized>(backend: &B, data: &mut MembershipData) -> Result<()> {
    let Some(id) = data.id.as_deref() else {
        return Ok(());
    };
    let codec = data.relation.codec();
    let key = codec.extract(id)?;

    match find_member(backend, data.relation, key.parent(), key.member())? {
        Lookup::Absent => {
            debug!(relation = %data.relation, id, "membership no longer present");
            data.id = None;
        }
        Lookup::Present(canonical) => {
            let (parent, _) = key.into_parts();
            data.id = Some(codec.build(&parent, &canonical));
            data.parent = parent;
            data.member = canonical;
        }
    }
    Ok(())
}

/// Add the member to the parent, then read back canonical attributes.
///
/// The backend's add call takes the member first and the parent second.
pub fn create<B: Backend + ?Sized>(backend: &B, data: &mut MembershipData) -> Result<()> {
    backend.add_member(data.relation, &data.member, &data.parent)?;

    let id = data.relation.codec().build(&data.parent, &data.member);
    info!(relation = %data.relation, id = %id, "membership created");
    data.id = Some(id);

    read(backend, data)
}

/// Remove the member from the parent and clear the stored id.
///
/// The backend's remove call takes the parent first, the reverse of add.
/// Whether removing an already-absent member succeeds is up to the backend.
pub fn delete<B: Backend + ?Sized>(backend: &B, data: &mut MembershipData) -> Result<()> {
    let Some(id) = data.id.as_deref() else {
        return Ok(());
    };
    let key = data.relation.codec().extract(id)?;

    backend.remove_member(data.relation, key.parent(), key.member())?;

    info!(relation = %data.relation, id = %key, "membership deleted");
    data.id = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::memory::Op;
    use crate::core::backend::MemoryBackend;
    use crate::core::relation::Relation;
    use crate::error::{Error, IdentityError};

    fn vault_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert_vault("v1", "Ops");
        backend
    }

    #[test]
    fn test_create_normalizes_user_to_uppercase() {
        let backend = vault_backend();
        let mut data = MembershipData::new(Relation::VaultMember, "V1", "u1");

        create(&backend, &mut data).unwrap();

        assert_eq!(data.id.as_deref(), Some("v1-u1"));
        assert_eq!(data.parent, "v1");
        assert_eq!(data.member, "U1");
    }

    #[test]
    fn test_create_passes_member_before_parent() {
        let backend = vault_backend();
        let mut data = MembershipData::new(Relation::VaultMember, "v1", "U1");

        create(&backend, &mut data).unwrap();

        let add = &backend.calls_to(Op::AddMember)[0];
        assert_eq!(add.args, vec!["vault_member", "U1", "v1"]);
    }

    #[test]
    fn test_delete_passes_parent_before_member() {
        let backend = vault_backend();
        let mut data = MembershipData::new(Relation::VaultMember, "v1", "U1");
        create(&backend, &mut data).unwrap();

        delete(&backend, &mut data).unwrap();

        let remove = &backend.calls_to(Op::RemoveMember)[0];
        assert_eq!(remove.args, vec!["vault_member", "v1", "U1"]);
        assert!(!data.exists());
    }

    #[test]
    fn test_read_clears_id_when_member_removed_externally() {
        let backend = vault_backend();
        let mut data = MembershipData::new(Relation::VaultMember, "v1", "U1");
        create(&backend, &mut data).unwrap();

        backend.drop_member(Relation::VaultMember, "v1", "U1");
        read(&backend, &mut data).unwrap();

        assert_eq!(data.id, None);
    }

    #[test]
    fn test_import_by_id_repopulates_attributes() {
        let backend = vault_backend();
        backend.insert_member(Relation::VaultMember, "v1", "ABC");
        let mut data = MembershipData::from_id(Relation::VaultMember, "v1-abc");

        read(&backend, &mut data).unwrap();

        assert_eq!(data.id.as_deref(), Some("v1-abc"));
        assert_eq!(data.parent, "v1");
        assert_eq!(data.member, "ABC");
    }

    #[test]
    fn test_group_vault_lifecycle() {
        let backend = vault_backend().with_group("g1");
        let mut data = MembershipData::new(Relation::GroupVault, "g1", "v1");

        create(&backend, &mut data).unwrap();
        assert_eq!(data.id.as_deref(), Some("g1-v1"));
        assert_eq!(backend.members(Relation::GroupVault, "g1"), vec!["v1"]);

        delete(&backend, &mut data).unwrap();
        read(&backend, &mut data).unwrap();
        assert_eq!(data.id, None);
        assert!(backend.members(Relation::GroupVault, "g1").is_empty());
    }

    #[test]
    fn test_read_rejects_malformed_id() {
        let backend = vault_backend();
        let mut data = MembershipData::from_id(Relation::GroupVault, "g1-abc-123");

        let err = read(&backend, &mut data).unwrap_err();

        assert!(matches!(
            err,
            Error::Identity(IdentityError::Malformed { .. })
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_create_failure_leaves_no_id() {
        let backend = vault_backend();
        backend.fail(Op::AddMember, "forbidden");
        let mut data = MembershipData::new(Relation::VaultMember, "v1", "U1");

        assert!(create(&backend, &mut data).is_err());
        assert_eq!(data.id, None);
    }
}
