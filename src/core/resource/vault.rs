//! Vault controller.

use tracing::{debug, info, warn};

use super::VaultData;
use crate::core::backend::Backend;
use crate::core::lookup::{self, Lookup};
use crate::core::relation::Relation;
use crate::error::{Error, IdentityError, Result};

const KIND: &str = "vault";

/// Refresh `data` from the backend.
///
/// A vault the backend reports as not found clears `data.id`; any other
/// failure is returned.
pub fn read<B: Backend + ?Sized>(backend: &B, data: &mut VaultData) -> Result<()> {
    let Some(id) = data.id.clone() else {
        return Ok(());
    };

    match lookup::entity(backend.read_vault(&id))? {
        Lookup::Present(record) => {
            data.id = Some(record.id);
            data.name = record.name;
        }
        Lookup::Absent => {
            debug!(id = %id, "vault no longer present");
            data.id = None;
        }
    }
    Ok(())
}

/// Create the vault, run the incognito cleanup if requested, then read back.
///
/// With `incognito` set, the acting principal is removed from the new vault's
/// members right after creation. The new id is stored before the cleanup runs,
/// so a failed cleanup still leaves the created vault tracked.
///
/// # Errors
///
/// - `Error::NoPrincipal` if incognito is requested but the backend has no
///   acting principal; nothing is created in that case
/// - `Error::IncognitoCleanup` if the vault was created but the cleanup failed
pub fn create<B: Backend + ?Sized>(backend: &B, data: &mut VaultData) -> Result<()> {
    let principal = if data.incognito {
        Some(backend.principal().ok_or(Error::NoPrincipal)?.to_string())
    } else {
        None
    };

    let record = backend.create_vault(&data.name)?;
    info!(id = %record.id, name = %record.name, "vault created");
    data.id = Some(record.id.clone());

    if let Some(principal) = principal {
        backend
            .remove_member(Relation::VaultMember, &record.id, &principal)
            .map_err(|source| {
                warn!(id = %record.id, %principal, "incognito cleanup failed");
                Error::IncognitoCleanup {
                    vault: record.id.clone(),
                    principal: principal.clone(),
                    source: Box::new(source),
                }
            })?;
        debug!(id = %record.id, "removed creator from vault");
    }

    read(backend, data)
}

/// Rename the vault, then read back.
pub fn update<B: Backend + ?Sized>(backend: &B, data: &mut VaultData) -> Result<()> {
    let id = data
        .id
        .clone()
        .ok_or(IdentityError::Missing { kind: KIND })?;

    backend.update_vault(&id, &data.name)?;
    info!(id = %id, name = %data.name, "vault renamed");

    read(backend, data)
}

/// Delete the vault unless it is safety-locked.
///
/// # Errors
///
/// Returns `Error::Protected` without contacting the backend when
/// `safety_lock` is set.
pub fn delete<B: Backend + ?Sized>(backend: &B, data: &mut VaultData) -> Result<()> {
    if data.safety_lock {
        return Err(Error::Protected {
            id: data.id.clone().unwrap_or_default(),
        });
    }
    let Some(id) = data.id.clone() else {
        return Ok(());
    };

    backend.delete_vault(&id)?;
    info!(id = %id, "vault deleted");
    data.id = None;
    Ok(())
}
