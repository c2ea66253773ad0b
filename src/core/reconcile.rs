//! Refresh, apply and import.
//!
//! These drive the resource controllers for a whole manifest. Resources are
//! handled one at a time, and state is checkpointed after every resource
//! that changed so a failure halfway keeps everything done before it.
//!
//! Apply order:
//!
//! 1. delete relationships that are removed or replaced
//! 2. create and update vaults
//! 3. create relationships (new and replaced)
//! 4. delete vaults

use tracing::{debug, info, warn};

use crate::core::address::{Address, Kind};
use crate::core::backend::Backend;
use crate::core::constants::VAULT_REF_PREFIX;
use crate::core::manifest::{Desired, Manifest, Target, VaultSpec};
use crate::core::plan::{self, Action, Change, Plan};
use crate::core::resource::{self, membership, vault, MembershipData, Resource, VaultData};
use crate::core::state::State;
use crate::error::{ConfigError, Error, Result, StateError};

/// What an apply actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
}

/// Read every stored resource back from the backend.
///
/// Resources the backend no longer has are dropped from state and returned.
///
/// # Errors
///
/// Stops at the first backend failure; resources refreshed before it keep
/// their new values. A membership whose parent vault was deleted outside
/// opsync fails with `BackendError::NotFound` on every refresh until it is
/// dropped from state (`opsync state rm <address>`).
pub fn refresh<B: Backend + ?Sized>(backend: &B, state: &mut State) -> Result<Vec<Address>> {
    let mut gone = Vec::new();
    for address in state.addresses() {
        let Some(mut resource) = state.get(&address)? else {
            continue;
        };
        resource::read(backend, &mut resource)?;
        if !resource.exists() {
            warn!(%address, "resource no longer exists in backend");
            gone.push(address.clone());
        }
        state.put(&address, &resource);
    }
    debug!(gone = gone.len(), "refresh finished");
    Ok(gone)
}

/// Start managing an existing backend resource by id.
///
/// For vaults, `safety_lock` and `incognito` are taken from the manifest when
/// the address is declared there.
///
/// # Errors
///
/// - `StateError::AlreadyManaged` if the address is already in state
/// - `Error::ImportNotFound` if the backend has no such resource
pub fn import<B: Backend + ?Sized>(
    backend: &B,
    manifest: Option<&Manifest>,
    state: &mut State,
    address: &Address,
    id: &str,
) -> Result<Resource> {
    if state.contains(address) {
        return Err(StateError::AlreadyManaged(address.to_string()).into());
    }

    let mut resource = match address.kind().relation() {
        None => {
            let mut data = VaultData::from_id(id);
            if let Some(spec) = manifest.and_then(|m| m.vault_spec(address.name())) {
                data.safety_lock = spec.safety_lock;
                data.incognito = spec.incognito;
            }
            Resource::Vault(data)
        }
        Some(relation) => Resource::Membership(MembershipData::from_id(relation, id)),
    };

    resource::read(backend, &mut resource)?;
    if !resource.exists() {
        return Err(Error::ImportNotFound {
            address: address.to_string(),
            id: id.to_string(),
        });
    }

    info!(%address, id, "imported");
    state.put(address, &resource);
    Ok(resource)
}

/// Carry out `plan`.
///
/// `checkpoint` is called with the updated state after every resource that
/// changed, typically to save it.
pub fn apply<B, F>(
    backend: &B,
    manifest: &Manifest,
    state: &mut State,
    plan: &Plan,
    mut checkpoint: F,
) -> Result<Summary>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    let desired = manifest.resources()?;
    let mut summary = Summary::default();
    let is_vault = |c: &&Change| c.address.kind() == Kind::Vault;

    for change in plan.pending().filter(|c| !is_vault(c)) {
        if matches!(change.action, Action::Delete | Action::Replace) {
            destroy(backend, state, &change.address, &mut checkpoint)?;
            if change.action == Action::Delete {
                summary.deleted += 1;
            }
        }
    }

    for change in plan.pending().filter(is_vault) {
        let Some(Desired::Vault(spec)) = desired.get(&change.address) else {
            continue;
        };
        match change.action {
            Action::Create => {
                create_vault(backend, state, &change.address, spec, &mut checkpoint)?;
                summary.created += 1;
            }
            Action::Update => {
                update_vault(backend, state, &change.address, spec, &mut checkpoint)?;
                summary.updated += 1;
            }
            _ => {}
        }
    }

    for change in plan.pending().filter(|c| !is_vault(c)) {
        if !matches!(change.action, Action::Create | Action::Replace) {
            continue;
        }
        let Some(Desired::Membership {
            relation,
            parent,
            member,
        }) = desired.get(&change.address)
        else {
            continue;
        };
        let parent = target_id(&change.address, parent, state)?;
        let member = target_id(&change.address, member, state)?;
        create_membership(
            backend,
            state,
            &change.address,
            MembershipData::new(*relation, parent, member),
            &mut checkpoint,
        )?;
        if change.action == Action::Create {
            summary.created += 1;
        } else {
            summary.replaced += 1;
        }
    }

    for change in plan.pending().filter(is_vault) {
        if change.action == Action::Delete {
            destroy(backend, state, &change.address, &mut checkpoint)?;
            summary.deleted += 1;
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        replaced = summary.replaced,
        deleted = summary.deleted,
        "apply finished"
    );
    Ok(summary)
}

/// Convenience: refresh, plan and apply in one go.
pub fn converge<B, F>(
    backend: &B,
    manifest: &Manifest,
    state: &mut State,
    checkpoint: F,
) -> Result<Summary>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    refresh(backend, state)?;
    let plan = plan::compute(manifest, state)?;
    apply(backend, manifest, state, &plan, checkpoint)
}

fn persist<F>(state: &mut State, address: &Address, resource: &Resource, checkpoint: &mut F) -> Result<()>
where
    F: FnMut(&mut State) -> Result<()>,
{
    state.put(address, resource);
    checkpoint(state)
}

fn create_vault<B, F>(
    backend: &B,
    state: &mut State,
    address: &Address,
    spec: &VaultSpec,
    checkpoint: &mut F,
) -> Result<()>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    let mut data = VaultData {
        id: None,
        name: spec.name.clone(),
        safety_lock: spec.safety_lock,
        incognito: spec.incognito,
    };
    let result = vault::create(backend, &mut data);
    // a vault that exists in the backend is tracked even if a later step failed
    if data.exists() {
        persist(state, address, &Resource::Vault(data), checkpoint)?;
    }
    result
}

fn update_vault<B, F>(
    backend: &B,
    state: &mut State,
    address: &Address,
    spec: &VaultSpec,
    checkpoint: &mut F,
) -> Result<()>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    let Some(Resource::Vault(mut data)) = state.get(address)? else {
        return Err(StateError::UnknownAddress(address.to_string()).into());
    };
    let rename = data.name != spec.name;
    data.safety_lock = spec.safety_lock;
    data.incognito = spec.incognito;
    if rename {
        data.name = spec.name.clone();
        vault::update(backend, &mut data)?;
    }
    persist(state, address, &Resource::Vault(data), checkpoint)
}

fn create_membership<B, F>(
    backend: &B,
    state: &mut State,
    address: &Address,
    mut data: MembershipData,
    checkpoint: &mut F,
) -> Result<()>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    let result = membership::create(backend, &mut data);
    if data.exists() {
        persist(state, address, &Resource::Membership(data), checkpoint)?;
    } else if result.is_ok() {
        warn!(%address, "membership was added but is not listed by the backend");
    }
    result
}

fn destroy<B, F>(backend: &B, state: &mut State, address: &Address, checkpoint: &mut F) -> Result<()>
where
    B: Backend + ?Sized,
    F: FnMut(&mut State) -> Result<()>,
{
    let Some(mut resource) = state.get(address)? else {
        return Ok(());
    };
    resource::delete(backend, &mut resource)?;
    persist(state, address, &resource, checkpoint)
}

fn target_id(address: &Address, target: &Target, state: &State) -> Result<String> {
    plan::resolve(target, state).ok_or_else(|| {
        let name = match target {
            Target::Vault(name) => name.as_str(),
            Target::Id(id) => id.as_str(),
        };
        ConfigError::UnknownReference {
            address: address.to_string(),
            target: format!("{}{}", VAULT_REF_PREFIX, name),
        }
        .into()
    })
}
