//! Presence lookups against the backend.
//!
//! Both resource kinds answer the same question on Read: is the thing still
//! there? [`Lookup`] carries the answer; backend failures stay in the
//! surrounding `Result` so "went away" and "could not ask" never blur.

use tracing::trace;

use crate::core::backend::Backend;
use crate::core::relation::Relation;
use crate::error::{BackendError, Error, Result};

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Present(T),
    Absent,
}

/// Turn a backend fetch into a lookup, treating `NotFound` as absence.
pub fn entity<T>(fetched: Result<T>) -> Result<Lookup<T>> {
    match fetched {
        Ok(value) => Ok(Lookup::Present(value)),
        Err(Error::Backend(BackendError::NotFound(reason))) => {
            trace!(%reason, "entity absent");
            Ok(Lookup::Absent)
        }
        Err(e) => Err(e),
    }
}

/// Find `member` among the members of `parent`.
///
/// Lists every member of the parent and returns the canonical id of the first
/// record whose id equals `member`. A missing member is `Lookup::Absent`, not
/// an error.
///
/// # Errors
///
/// Propagates any failure of the list call (missing parent id, auth, parent
/// not found).
pub fn find_member<B: Backend + ?Sized>(
    backend: &B,
    relation: Relation,
    parent: &str,
    member: &str,
) -> Result<Lookup<String>> {
    let members = backend.list_members(relation, parent)?;
    trace!(%relation, parent, count = members.len(), "listed members");

    Ok(members
        .into_iter()
        .find(|record| record.id == member)
        .map_or(Lookup::Absent, |record| Lookup::Present(record.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::memory::Op;
    use crate::core::backend::MemoryBackend;

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert_vault("v1", "Ops");
        backend.insert_member(Relation::VaultMember, "v1", "U1");
        backend.insert_member(Relation::VaultMember, "v1", "U2");
        backend
    }

    #[test]
    fn test_find_member_present() {
        let backend = backend();
        let found = find_member(&backend, Relation::VaultMember, "v1", "U2").unwrap();
        assert_eq!(found, Lookup::Present("U2".to_string()));
    }

    #[test]
    fn test_find_member_absent_is_not_an_error() {
        let backend = backend();
        let found = find_member(&backend, Relation::VaultMember, "v1", "U9").unwrap();
        assert_eq!(found, Lookup::Absent);
    }

    #[test]
    fn test_find_member_compares_exactly() {
        let backend = backend();
        let found = find_member(&backend, Relation::VaultMember, "v1", "u1").unwrap();
        assert_eq!(found, Lookup::Absent);
    }

    #[test]
    fn test_find_member_propagates_list_failure() {
        let backend = backend();
        backend.fail(Op::ListMembers, "not signed in");
        let err = find_member(&backend, Relation::VaultMember, "v1", "U1").unwrap_err();
        assert!(err.to_string().contains("not signed in"));
    }

    #[test]
    fn test_find_member_empty_parent_fails() {
        let backend = backend();
        let err = find_member(&backend, Relation::VaultMember, "", "U1").unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::MissingParent)));
    }

    #[test]
    fn test_entity_maps_not_found_to_absent() {
        let fetched: Result<u8> = Err(BackendError::NotFound("gone".into()).into());
        assert_eq!(entity(fetched).unwrap(), Lookup::Absent);
    }

    #[test]
    fn test_entity_keeps_other_errors() {
        let fetched: Result<u8> = Err(BackendError::MissingParent.into());
        assert!(entity(fetched).is_err());
        assert_eq!(entity(Ok(7u8)).unwrap(), Lookup::Present(7));
    }
}
