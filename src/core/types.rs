//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// The opaque identifier stored for a resource instance.
///
/// For vaults this is the backend id; for relationships it is a composite id.
pub type ResourceId = String;

/// A manifest resource name (the part after the kind in an address).
pub type ResourceName = String;
