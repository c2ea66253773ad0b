//! Composite identifiers for relationship resources.
//!
//! The backend has no identifier for a membership, so one is synthesized from
//! the parent id and the member id:
//!
//! ```text
//! lower(parent) + "-" + lower(member)
//! ```
//!
//! Extraction splits on the separator and re-normalizes the member to the
//! casing the backend lists it in. Encode/decode are therefore inverse only
//! up to that normalization; the original casing of the input is not kept.
//!
//! Neither half may contain the separator itself. The codec does not check
//! this: `build("G1", "ABC-123")` happily yields `g1-abc-123`, which then
//! fails to extract. Manifest loading rejects such ids before they get here.

use std::fmt;

use crate::core::constants::ID_SEPARATOR;
use crate::error::IdentityError;

/// Casing the backend uses for member ids in its list output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberCase {
    Lower,
    Upper,
}

impl MemberCase {
    /// Normalize a member id to this casing.
    pub fn apply(self, member: &str) -> String {
        match self {
            MemberCase::Lower => member.to_lowercase(),
            MemberCase::Upper => member.to_uppercase(),
        }
    }
}

/// A parsed composite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    parent: String,
    member: String,
}

impl CompositeId {
    /// Parent half, always lowercase.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Member half, in the relation's canonical casing.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn into_parts(self) -> (String, String) {
        (self.parent, self.member)
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.parent.to_lowercase(),
            ID_SEPARATOR,
            self.member.to_lowercase()
        )
    }
}

/// Builds and parses composite identifiers for one relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    kind: &'static str,
    format: &'static str,
    member_case: MemberCase,
}

impl Codec {
    /// Group ↔ vault grants. Vault ids are listed lowercase.
    pub const GROUP_VAULT: Codec = Codec {
        kind: "group vault",
        format: "groupid-vaultid",
        member_case: MemberCase::Lower,
    };

    /// Vault ↔ user memberships. User ids are listed uppercase.
    pub const VAULT_MEMBER: Codec = Codec {
        kind: "vault member",
        format: "vaultid-userid",
        member_case: MemberCase::Upper,
    };

    pub fn member_case(&self) -> MemberCase {
        self.member_case
    }

    /// Conjoin parent and member into a single lowercase identifier.
    pub fn build(&self, parent: &str, member: &str) -> String {
        format!(
            "{}{}{}",
            parent.to_lowercase(),
            ID_SEPARATOR,
            member.to_lowercase()
        )
    }

    /// Split an identifier built by [`Codec::build`] back into its halves.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Malformed` unless the id contains exactly one
    /// separator.
    pub fn extract(&self, id: &str) -> Result<CompositeId, IdentityError> {
        let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
        match parts.as_slice() {
            [parent, member] => Ok(CompositeId {
                parent: parent.to_lowercase(),
                member: self.member_case.apply(member),
            }),
            _ => Err(IdentityError::Malformed {
                kind: self.kind,
                format: self.format,
                id: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_lowercases_both_halves() {
        assert_eq!(Codec::GROUP_VAULT.build("G1", "VLT9"), "g1-vlt9");
        assert_eq!(Codec::VAULT_MEMBER.build("V1", "u1"), "v1-u1");
    }

    #[test]
    fn test_extract_group_vault_keeps_member_lowercase() {
        let id = Codec::GROUP_VAULT.extract("g1-vlt9").unwrap();
        assert_eq!(id.parent(), "g1");
        assert_eq!(id.member(), "vlt9");
    }

    #[test]
    fn test_extract_vault_member_uppercases_member() {
        let id = Codec::VAULT_MEMBER.extract("v1-u1").unwrap();
        assert_eq!(id.parent(), "v1");
        assert_eq!(id.member(), "U1");
    }

    #[test]
    fn test_extract_lowercases_imported_parent() {
        let id = Codec::VAULT_MEMBER.extract("VLT-abc").unwrap();
        assert_eq!(id.into_parts(), ("vlt".to_string(), "ABC".to_string()));
    }

    #[test]
    fn test_extract_rejects_missing_separator() {
        let err = Codec::GROUP_VAULT.extract("g1vlt9").unwrap_err();
        assert!(matches!(err, IdentityError::Malformed { .. }));
    }

    #[test]
    fn test_separator_collision_is_not_extractable() {
        let id = Codec::GROUP_VAULT.build("G1", "ABC-123");
        assert_eq!(id, "g1-abc-123");
        let err = Codec::GROUP_VAULT.extract(&id).unwrap_err();
        assert_eq!(
            err,
            IdentityError::Malformed {
                kind: "group vault",
                format: "groupid-vaultid",
                id: "g1-abc-123".to_string(),
            }
        );
    }

    #[test]
    fn test_display_renders_build_form() {
        let id = Codec::VAULT_MEMBER.extract("v1-u1").unwrap();
        assert_eq!(id.to_string(), "v1-u1");
    }

    #[test]
    fn test_malformed_message_names_format() {
        let err = Codec::VAULT_MEMBER.extract("a-b-c").unwrap_err();
        assert!(err.to_string().contains("vaultid-userid"));
    }
}
