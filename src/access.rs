//! Deciding whether a user may perform an operation on a node.
//!
//! Access rules set on a node apply to that node and all its descendants.
//! To check a permission the node and then each of its ancestors are
//! searched for a rule granting it to any group the user is a member of,
//! including [everyone][crate::models::Group::Everyone]. The first node
//! with such a rule ends the search.
//!
//! Users who can edit a node, that is members of any group of its workflow,
//! can always read it, even if no access rule says so.

use failure::Fail;
use log::{debug, trace};
use std::collections::BTreeMap;

use crate::{
    ApiError,
    models::{GroupId, NodeId, UserId, group::EVERYONE, node::Ancestors},
    permissions::Permission,
    release::{ReleaseState, ReleaseStateError},
    store::{Store, StoreError},
};

/// Access rules which granted a permission, grouped by node they are set on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PermittingRules {
    rules: BTreeMap<NodeId, Vec<GroupId>>,
}

impl PermittingRules {
    /// Was permission granted by editor's implicit read access rather than by
    /// an access rule?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, node: NodeId, group: GroupId) -> bool {
        self.rules.get(&node).map_or(false, |groups| groups.contains(&group))
    }

    /// Iterate over all `(node, groups)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[GroupId])> + '_ {
        self.rules.iter().map(|(&node, groups)| (node, groups.as_slice()))
    }

    /// Would permission still be granted if the rule for `group` on `node`
    /// was removed?
    ///
    /// Administrative interfaces use this to prevent users from revoking
    /// their own last rule.
    pub fn survives_removal_of(&self, node: NodeId, group: GroupId) -> bool {
        self.rules.iter()
            .flat_map(|(&n, groups)| groups.iter().map(move |&g| (n, g)))
            .any(|rule| rule != (node, group))
    }

    fn insert(&mut self, node: NodeId, group: GroupId) {
        self.rules.entry(node).or_insert_with(Vec::new).push(group);
    }
}

/// Verify that a user has a permission on a node.
///
/// Pass `None` as `user` for anonymous requests.
pub fn check_permission<S>(
    store: &S,
    node: NodeId,
    user: Option<UserId>,
    required: Permission,
) -> Result<(), CheckPermissionError>
where
    S: Store + ?Sized,
{
    resolve(store, node, user, required, false).map(drop)
}

/// Verify that a user has a permission on a node, and find all access rules
/// granting it.
///
/// Unlike [`check_permission()`] this function doesn't stop at the first
/// node with a sufficient rule, but collects sufficient rules from all
/// ancestors. If the permission was only granted because the user can edit
/// the node, the returned set is empty.
pub fn check_permission_with_rules<S>(
    store: &S,
    node: NodeId,
    user: Option<UserId>,
    required: Permission,
) -> Result<PermittingRules, CheckPermissionError>
where
    S: Store + ?Sized,
{
    resolve(store, node, user, required, true)
}

fn resolve<S>(
    store: &S,
    node: NodeId,
    user: Option<UserId>,
    required: Permission,
    collect: bool,
) -> Result<PermittingRules, CheckPermissionError>
where
    S: Store + ?Sized,
{
    let mut permitting = PermittingRules::default();

    if required == Permission::None {
        return Ok(permitting);
    }

    let groups = match user {
        Some(user) => {
            let mut groups = store.groups_of(user)?
                .into_iter()
                .map(|group| group.id)
                .collect::<Vec<_>>();
            groups.push(EVERYONE);
            groups
        }
        // Anonymous users can only ever be granted read access.
        None if required > Permission::Read => {
            return Err(CheckPermissionError::Unauthorized { node, required });
        }
        None => vec![EVERYONE],
    };

    for ancestor in Ancestors::from_id(store, node) {
        let ancestor = ancestor?;

        for rule in store.access_rules(ancestor.id)? {
            if !groups.contains(&rule.group) || !rule.permission.satisfies(required) {
                continue;
            }

            trace!("Rule for group {} on node {} grants {} on node {}",
                rule.group, rule.node, required, node);
            permitting.insert(rule.node, rule.group);

            if !collect {
                return Ok(permitting);
            }
        }
    }

    if !permitting.is_empty() {
        return Ok(permitting);
    }

    if required == Permission::Read {
        let state = ReleaseState::for_node(store, node, user)?;

        if state.can_edit() {
            debug!("Granting read access to node {} to its editor {:?}",
                node, user);
            return Ok(permitting);
        }
    }

    Err(CheckPermissionError::Unauthorized { node, required })
}

#[derive(ApiError, Debug, Fail)]
pub enum CheckPermissionError {
    /// The user doesn't have required permission.
    #[fail(display = "Permission {} denied on node {}", required, node)]
    #[api(code = "node:access-denied", status = "FORBIDDEN")]
    Unauthorized {
        node: NodeId,
        required: Permission,
    },
    /// Could not determine whether the user is an editor.
    #[fail(display = "{}", _0)]
    ReleaseState(#[cause] ReleaseStateError),
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for CheckPermissionError ;
    ReleaseStateError => |e| CheckPermissionError::ReleaseState(e),
    StoreError => |e| CheckPermissionError::Store(e),
}

impl CheckPermissionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(*self, CheckPermissionError::Unauthorized { .. })
    }
}
