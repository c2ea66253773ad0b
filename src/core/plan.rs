//! Change planning.
//!
//! Compares the manifest with (already refreshed) state and decides what has
//! to happen to each address. Planning never talks to the backend.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::address::{Address, Kind};
use crate::core::manifest::{Desired, Manifest, Target, VaultSpec};
use crate::core::relation::Relation;
use crate::core::resource::{MembershipData, Resource, VaultData};
use crate::core::state::State;
use crate::error::Result;

/// What will happen to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    /// In-place change of a vault (rename or safety lock).
    Update,
    /// Relationship keys changed: delete the old membership, create the new.
    Replace,
    Delete,
    NoOp,
}

impl Action {
    pub fn symbol(self) -> &'static str {
        match self {
            Action::Create => "+",
            Action::Update => "~",
            Action::Replace => "-/+",
            Action::Delete => "-",
            Action::NoOp => " ",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Replace => "replace",
            Action::Delete => "delete",
            Action::NoOp => "no-op",
        };
        f.write_str(word)
    }
}

/// One planned change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub address: Address,
    pub action: Action,
    /// Human-readable attribute changes.
    pub details: Vec<String>,
}

/// The full plan, in address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub changes: Vec<Change>,
}

impl Plan {
    /// Changes that are not no-ops.
    pub fn pending(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.action != Action::NoOp)
    }

    pub fn has_changes(&self) -> bool {
        self.pending().next().is_some()
    }

    pub fn count(&self, action: Action) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    pub fn action(&self, address: &Address) -> Option<Action> {
        self.changes
            .iter()
            .find(|c| &c.address == address)
            .map(|c| c.action)
    }
}

/// Compute the plan for `manifest` against `state`.
///
/// # Errors
///
/// Returns an error if the manifest has invalid addresses or state holds an
/// undecodable resource.
pub fn compute(manifest: &Manifest, state: &State) -> Result<Plan> {
    let desired = manifest.resources()?;
    let mut changes = Vec::new();

    for (address, want) in &desired {
        let stored = state.get(address)?;
        let change = match (want, stored) {
            (Desired::Vault(spec), Some(Resource::Vault(have))) => diff_vault(address, spec, &have),
            (Desired::Vault(spec), _) => Change {
                address: address.clone(),
                action: Action::Create,
                details: vec![format!("name: {}", spec.name)],
            },
            (
                Desired::Membership {
                    relation,
                    parent,
                    member,
                },
                stored,
            ) => {
                let have = match stored {
                    Some(Resource::Membership(m)) => Some(m),
                    _ => None,
                };
                diff_membership(address, *relation, parent, member, have.as_ref(), state)
            }
        };
        changes.push(change);
    }

    for address in state.addresses() {
        if desired.contains_key(&address) {
            continue;
        }
        let mut details = Vec::new();
        if let Some(Resource::Vault(v)) = state.get(&address)? {
            if v.safety_lock {
                details.push("safety_lock is set; delete will be refused".to_string());
            }
        }
        changes.push(Change {
            address,
            action: Action::Delete,
            details,
        });
    }

    changes.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(Plan { changes })
}

fn diff_vault(address: &Address, spec: &VaultSpec, have: &VaultData) -> Change {
    let mut details = Vec::new();
    if have.name != spec.name {
        details.push(format!("name: {} → {}", have.name, spec.name));
    }
    if have.safety_lock != spec.safety_lock {
        details.push(format!(
            "safety_lock: {} → {}",
            have.safety_lock, spec.safety_lock
        ));
    }
    let action = if details.is_empty() {
        Action::NoOp
    } else {
        Action::Update
    };
    Change {
        address: address.clone(),
        action,
        details,
    }
}

fn diff_membership(
    address: &Address,
    relation: Relation,
    parent: &Target,
    member: &Target,
    have: Option<&MembershipData>,
    state: &State,
) -> Change {
    let parent_id = resolve(parent, state);
    let member_id = resolve(member, state);
    let shown = |t: &Target, id: &Option<String>| match id {
        Some(id) => id.clone(),
        None => format!("{} (known after apply)", describe(t)),
    };
    let want = format!(
        "{}: {}, {}: {}",
        relation.parent_attr(),
        shown(parent, &parent_id),
        relation.member_attr(),
        shown(member, &member_id)
    );

    let (action, details) = match (have, parent_id, member_id) {
        (None, _, _) => (Action::Create, vec![want]),
        (Some(have), Some(p), Some(m)) => {
            let same = have
                .id
                .as_deref()
                .is_some_and(|id| id == relation.codec().build(&p, &m));
            if same {
                (Action::NoOp, Vec::new())
            } else {
                (
                    Action::Replace,
                    vec![format!("{} → {}", have.id.as_deref().unwrap_or_default(), want)],
                )
            }
        }
        (Some(have), _, _) => (
            Action::Replace,
            vec![format!("{} → {}", have.id.as_deref().unwrap_or_default(), want)],
        ),
    };

    Change {
        address: address.clone(),
        action,
        details,
    }
}

/// The backend id a target currently stands for, if known.
pub fn resolve(target: &Target, state: &State) -> Option<String> {
    match target {
        Target::Id(id) => Some(id.clone()),
        Target::Vault(name) => {
            let address = Address::new(Kind::Vault, name).ok()?;
            state.id(&address).map(str::to_string)
        }
    }
}

fn describe(target: &Target) -> String {
    match target {
        Target::Id(id) => id.clone(),
        Target::Vault(name) => format!("vault.{}", name),
    }
}

/// Count of planned actions, keyed for summaries.
pub fn tally(plan: &Plan) -> BTreeMap<&'static str, usize> {
    BTreeMap::from([
        ("create", plan.count(Action::Create)),
        ("update", plan.count(Action::Update)),
        ("replace", plan.count(Action::Replace)),
        ("delete", plan.count(Action::Delete)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn manifest() -> Manifest {
        Manifest::parse(
            r#"
[vault.eng]
name = "Engineering"

[vault_member.alice]
vault = "vault.eng"
user = "u1"

[group_vault.admins]
group = "g1"
vault = "vault.eng"
"#,
        )
        .unwrap()
    }

    fn stored_state() -> State {
        let mut state = State::new();
        state.put(
            &addr("vault.eng"),
            &Resource::Vault(VaultData {
                id: Some("vlt1".into()),
                name: "Engineering".into(),
                ..VaultData::default()
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
        state.put(
            &addr("group_vault.admins"),
            &Resource::Membership(MembershipData {
                relation: Relation::GroupVault,
                id: Some("g1-vlt1".into()),
                parent: "g1".into(),
                member: "vlt1".into(),
            }),
        );
        state
    }

    #[test]
    fn test_empty_state_plans_creates() {
        let plan = compute(&manifest(), &State::new()).unwrap();
        assert_eq!(plan.count(Action::Create), 3);
        let alice = plan
            .changes
            .iter()
            .find(|c| c.address == addr("vault_member.alice"))
            .unwrap();
        assert!(alice.details[0].contains("known after apply"));
    }

    #[test]
    fn test_converged_state_is_noop() {
        let plan = compute(&manifest(), &stored_state()).unwrap();
        assert!(!plan.has_changes(), "unexpected plan: {:?}", plan);
    }

    #[test]
    fn test_rename_is_update() {
        let manifest = Manifest::parse(
            "[vault.eng]\nname = \"Eng\"\nsafety_lock = true\n\
             [vault_member.alice]\nvault = \"vault.eng\"\nuser = \"u1\"\n\
             [group_vault.admins]\ngroup = \"g1\"\nvault = \"vault.eng\"\n",
        )
        .unwrap();
        let plan = compute(&manifest, &stored_state()).unwrap();
        assert_eq!(plan.action(&addr("vault.eng")), Some(Action::Update));
        let change = &plan.changes[plan
            .changes
            .iter()
            .position(|c| c.address == addr("vault.eng"))
            .unwrap()];
        assert_eq!(change.details.len(), 2);
    }

    #[test]
    fn test_changed_user_is_replace() {
        let manifest = Manifest::parse(
            "[vault.eng]\nname = \"Engineering\"\n\
             [vault_member.alice]\nvault = \"vault.eng\"\nuser = \"u2\"\n\
             [group_vault.admins]\ngroup = \"g1\"\nvault = \"vault.eng\"\n",
        )
        .unwrap();
        let plan = compute(&manifest, &stored_state()).unwrap();
        assert_eq!(plan.action(&addr("vault_member.alice")), Some(Action::Replace));
        assert_eq!(plan.action(&addr("group_vault.admins")), Some(Action::NoOp));
    }

    #[test]
    fn test_undeclared_resources_are_deleted() {
        let plan = compute(&Manifest::default(), &stored_state()).unwrap();
        assert_eq!(plan.count(Action::Delete), 3);
    }

    #[test]
    fn test_locked_vault_delete_is_flagged() {
        let mut state = State::new();
        state.put(
            &addr("vault.prod"),
            &Resource::Vault(VaultData {
                id: Some("vlt9".into()),
                name: "Prod".into(),
                safety_lock: true,
                incognito: false,
            }),
        );
        let plan = compute(&Manifest::default(), &state).unwrap();
        assert!(plan.changes[0].details[0].contains("safety_lock"));
    }

    #[test]
    fn test_tally() {
        let plan = compute(&manifest(), &State::new()).unwrap();
        let tally = tally(&plan);
        assert_eq!(tally["create"], 3);
        assert_eq!(tally["delete"], 0);
    }
}
