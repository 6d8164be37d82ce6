//! Position of a version within its workflow, and moves a user may make.
//!
//! A version is always held by one group of its node's workflow. Members of
//! that group edit it and then pass it on to the next group, until it has
//! passed the last one and is released to everyone. Who may move a version
//! where is decided by a [`ReleaseState`], computed separately for each
//! request, since both group membership and workflow assignment may change
//! between requests.
//!
//! ## Moves
//!
//! Every workflow is extended with a terminal [read-only][Group::ReadOnly]
//! group, standing for _released_. Movement of a version along the resulting
//! sequence is restricted by the user's memberships:
//!
//! - a user may _save_ a version into any group they are a member of, and
//!   into any group directly following one they are a member of;
//!
//! - a user may _revoke_ a version back to the nearest earlier group they are
//!   a member of;
//!
//! - a user may _release_ a version forward to the first later group directly
//!   following one they are a member of.

use failure::Fail;
use serde::Serialize;

use crate::{
    ApiError,
    models::{
        FindWorkflowError,
        Group,
        GroupId,
        NodeId,
        UserId,
        Workflow,
        effective_workflow,
        group::PublicData as GroupData,
        version::RELEASED,
    },
    store::{Store, StoreError},
};

/// Where in its workflow a version is, from a particular user's point of
/// view.
#[derive(Clone, Debug)]
pub struct ReleaseState {
    /// Workflow groups, followed by [`Group::ReadOnly`].
    groups: Vec<Group>,
    /// Position of the group currently holding the version.
    index: usize,
    /// Group ID stored on the version.
    version_group: GroupId,
    /// Is the user a member of the group at the same position in `groups`?
    is_member: Vec<bool>,
}

/// A subset of release state's data that can safely be publicly exposed.
#[derive(Debug, Serialize)]
pub struct PublicData {
    pub groups: Vec<GroupData>,
    pub current: usize,
    pub can_edit: bool,
    pub revoke_to: Option<usize>,
    pub release_to: Option<usize>,
    pub save_groups: Vec<usize>,
    pub suggested: Option<usize>,
}

impl ReleaseState {
    /// Compute release state of a version held by `group` in `workflow`, for
    /// `user`.
    ///
    /// If `group` is not part of the workflow, for example because the
    /// workflow was changed after the version was saved, the version is
    /// considered to be held by the first group.
    pub fn new<S>(
        store: &S,
        workflow: &Workflow,
        group: GroupId,
        user: Option<UserId>,
    ) -> Result<ReleaseState, StoreError>
    where
        S: Store + ?Sized,
    {
        let mut groups = workflow.groups().to_vec();
        groups.push(Group::ReadOnly);

        let is_member = groups.iter()
            .map(|g| g.has_member(store, user))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReleaseState::from_parts(groups, group, is_member))
    }

    /// Compute release state of a version of a node, for `user`.
    pub fn for_version<S>(
        store: &S,
        node: NodeId,
        version: i32,
        user: Option<UserId>,
    ) -> Result<ReleaseState, ReleaseStateError>
    where
        S: Store + ?Sized,
    {
        let workflow = effective_workflow(store, node)?;
        let version = store.version(node, version)?;
        ReleaseState::new(store, &workflow, version.workflow_group, user)
            .map_err(From::from)
    }

    /// Compute release state of the newest version of a node, for `user`.
    ///
    /// A node without versions is treated as if it had a released one.
    pub fn for_node<S>(store: &S, node: NodeId, user: Option<UserId>)
    -> Result<ReleaseState, ReleaseStateError>
    where
        S: Store + ?Sized,
    {
        let workflow = effective_workflow(store, node)?;
        let latest = store.node(node)?.max_version;

        let group = if latest > 0 {
            store.version(node, latest)?.workflow_group
        } else {
            RELEASED
        };

        ReleaseState::new(store, &workflow, group, user).map_err(From::from)
    }

    /// Construct release state from already resolved data.
    ///
    /// `groups` must already include the terminal read-only group, and
    /// `is_member` must have exactly one entry for each group.
    ///
    /// # Panics
    ///
    /// Panics if `groups` and `is_member` differ in length.
    pub(crate) fn from_parts(groups: Vec<Group>, version_group: GroupId, is_member: Vec<bool>)
    -> ReleaseState {
        assert_eq!(groups.len(), is_member.len(),
            "membership must be given for each group");

        let index = groups.iter()
            .position(|g| g.id() == version_group)
            .unwrap_or(0);

        ReleaseState { groups, index, version_group, is_member }
    }

    /// All groups a version passes through, ending with the read-only group.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Position of the group holding the version.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Group holding the version.
    pub fn current(&self) -> &Group {
        &self.groups[self.index]
    }

    /// Is the user a member of group at `position`?
    pub fn is_member(&self, position: usize) -> bool {
        self.is_member.get(position).cloned().unwrap_or(false)
    }

    /// Has the version been released?
    pub fn is_released(&self) -> bool {
        self.index + 1 == self.groups.len()
    }

    /// Can the user edit this node at all?
    ///
    /// Membership in any group of the workflow is enough, regardless of which
    /// group currently holds the version.
    pub fn can_edit(&self) -> bool {
        self.is_member.iter().any(|&m| m)
    }

    /// Position to which the user can revoke the version: the nearest
    /// earlier group they are a member of.
    pub fn revoke_position(&self) -> Option<usize> {
        (0..self.index).rev().find(|&i| self.is_member[i])
    }

    /// Group to which the user can revoke the version.
    pub fn revoke_to_group(&self) -> Option<&Group> {
        self.revoke_position().map(|i| &self.groups[i])
    }

    /// Position to which the user can release the version: the first later
    /// group whose predecessor they are a member of.
    pub fn release_position(&self) -> Option<usize> {
        (self.index + 1..self.groups.len()).find(|&i| self.is_member[i - 1])
    }

    /// Group to which the user can release the version.
    pub fn release_to_group(&self) -> Option<&Group> {
        self.release_position().map(|i| &self.groups[i])
    }

    /// Positions of all groups the user can save a version into, in order.
    pub fn save_positions(&self) -> Vec<usize> {
        (0..self.groups.len())
            .filter(|&i| {
                let own = !self.groups[i].is_everyone() && self.is_member[i];
                let passed = i > 0 && self.is_member[i - 1];
                own || passed
            })
            .collect()
    }

    /// All groups the user can save a version into, in order.
    pub fn save_groups(&self) -> Vec<&Group> {
        self.save_positions().into_iter().map(|i| &self.groups[i]).collect()
    }

    /// Can the user save a version into group `id`?
    pub fn is_save_group(&self, id: GroupId) -> bool {
        self.save_groups().iter().any(|g| g.id() == id)
    }

    /// Position of the group a user should be offered when saving by default.
    ///
    /// This is the group currently holding the version if the user can save
    /// into it, otherwise the first group they can save into. Releasing
    /// directly is never suggested.
    pub fn suggested_position(&self) -> Option<usize> {
        let candidates = self.save_positions()
            .into_iter()
            .filter(|&i| !self.groups[i].is_read_only())
            .collect::<Vec<_>>();

        candidates.iter()
            .cloned()
            .find(|&i| self.groups[i].id() == self.version_group)
            .or_else(|| candidates.first().cloned())
    }

    /// Group a user should be offered when saving by default.
    pub fn suggested_save_group(&self) -> Option<&Group> {
        self.suggested_position().map(|i| &self.groups[i])
    }

    /// Get public portion of this state's data.
    pub fn get_public(&self) -> PublicData {
        PublicData {
            groups: self.groups.iter().map(Group::get_public).collect(),
            current: self.index,
            can_edit: self.can_edit(),
            revoke_to: self.revoke_position(),
            release_to: self.release_position(),
            save_groups: self.save_positions(),
            suggested: self.suggested_position(),
        }
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum ReleaseStateError {
    #[fail(display = "{}", _0)]
    Workflow(#[cause] FindWorkflowError),
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for ReleaseStateError ;
    FindWorkflowError => |e| ReleaseStateError::Workflow(e),
    StoreError => |e| ReleaseStateError::Store(e),
}

#[cfg(test)]
mod tests {
    use crate::models::StoredGroup;
    use super::*;

    const A: GroupId = 10;
    const B: GroupId = 20;
    const C: GroupId = 30;

    fn group(id: GroupId, name: &str) -> Group {
        Group::Stored(StoredGroup { id, name: name.to_string() })
    }

    /// Workflow `[A, B, C]` with version held by `current`, for a user who is
    /// a member of `member_of`.
    fn held_by(current: GroupId, member_of: &[GroupId]) -> ReleaseState {
        let groups = vec![group(A, "A"), group(B, "B"), group(C, "C"), Group::ReadOnly];
        let is_member = groups.iter()
            .map(|g| !g.is_read_only() && member_of.contains(&g.id()))
            .collect();
        ReleaseState::from_parts(groups, current, is_member)
    }

    fn ids(groups: Vec<&Group>) -> Vec<GroupId> {
        groups.into_iter().map(Group::id).collect()
    }

    #[test]
    fn member_of_earlier_group() {
        let state = held_by(B, &[A]);

        assert_eq!(state.index(), 1);
        assert!(state.can_edit());
        assert_eq!(state.revoke_to_group().map(Group::id), Some(A));
        assert_eq!(state.release_to_group(), None);
        assert_eq!(ids(state.save_groups()), vec![A, B]);
        assert_eq!(state.suggested_save_group().map(Group::id), Some(B));
    }

    #[test]
    fn member_of_current_group() {
        let state = held_by(B, &[B]);

        assert_eq!(state.revoke_to_group(), None);
        assert_eq!(state.release_to_group().map(Group::id), Some(C));
        assert_eq!(ids(state.save_groups()), vec![B, C]);
        assert!(state.is_save_group(C));
        assert!(!state.is_save_group(A));
        assert_eq!(state.suggested_save_group().map(Group::id), Some(B));
    }

    #[test]
    fn member_of_last_group_can_release() {
        let state = held_by(C, &[C]);

        assert_eq!(state.release_to_group(), Some(&Group::ReadOnly));
        assert_eq!(ids(state.save_groups()), vec![C, 0]);
        assert!(state.is_save_group(RELEASED));
        assert_eq!(state.suggested_save_group().map(Group::id), Some(C));
    }

    #[test]
    fn release_skips_to_first_reachable_group() {
        // Held by A, user only in B: releasing moves past B, into C.
        let state = held_by(A, &[B]);

        assert_eq!(state.release_to_group().map(Group::id), Some(C));
        assert_eq!(state.revoke_to_group(), None);
        assert_eq!(state.suggested_save_group().map(Group::id), Some(B));
    }

    #[test]
    fn revoke_picks_nearest_earlier_group() {
        let state = held_by(C, &[A, B]);

        assert_eq!(state.revoke_to_group().map(Group::id), Some(B));
        assert_eq!(state.release_to_group(), None);
    }

    #[test]
    fn outsider_can_do_nothing() {
        let state = held_by(B, &[]);

        assert!(!state.can_edit());
        assert_eq!(state.revoke_to_group(), None);
        assert_eq!(state.release_to_group(), None);
        assert!(state.save_groups().is_empty());
        assert_eq!(state.suggested_save_group(), None);
    }

    #[test]
    fn unknown_group_defaults_to_first() {
        let state = held_by(99, &[A, B, C]);

        assert_eq!(state.index(), 0);
        assert_eq!(state.revoke_to_group(), None);
        assert_eq!(state.release_to_group().map(Group::id), Some(B));
        assert_eq!(state.suggested_save_group().map(Group::id), Some(A));
    }

    #[test]
    fn released_version_is_held_by_read_only_group() {
        let state = held_by(RELEASED, &[A]);

        assert_eq!(state.index(), 3);
        assert!(state.is_released());
        assert_eq!(state.current(), &Group::ReadOnly);
        assert_eq!(state.revoke_to_group().map(Group::id), Some(A));
    }

    #[test]
    fn empty_workflow_is_always_released() {
        let state = ReleaseState::from_parts(vec![Group::ReadOnly], 42, vec![false]);

        assert_eq!(state.index(), 0);
        assert!(state.is_released());
        assert!(!state.can_edit());
        assert!(state.save_groups().is_empty());
        assert_eq!(state.suggested_save_group(), None);
    }

    #[test]
    fn everyone_is_not_an_own_save_group() {
        let groups = vec![Group::Everyone, group(A, "A"), Group::ReadOnly];
        let state = ReleaseState::from_parts(groups, A, vec![true, false, false]);

        assert!(state.can_edit());
        assert_eq!(ids(state.save_groups()), vec![A]);
        assert_eq!(state.release_to_group(), None);
    }

    #[test]
    fn suggestion_does_not_depend_on_order() {
        // Current group is the last of several save groups.
        let state = held_by(C, &[A, B, C]);
        assert_eq!(ids(state.save_groups()), vec![A, B, C, 0]);
        assert_eq!(state.suggested_save_group().map(Group::id), Some(C));

        // And the first of them.
        let state = held_by(A, &[A, B, C]);
        assert_eq!(state.suggested_save_group().map(Group::id), Some(A));

        // Current group is not a save group.
        let state = held_by(A, &[B]);
        assert_eq!(ids(state.save_groups()), vec![B, C]);
        assert_eq!(state.suggested_save_group().map(Group::id), Some(B));
    }

    #[test]
    fn public_data() {
        let public = held_by(B, &[A]).get_public();

        assert_eq!(public.groups.len(), 4);
        assert_eq!(public.current, 1);
        assert!(public.can_edit);
        assert_eq!(public.revoke_to, Some(0));
        assert_eq!(public.release_to, None);
        assert_eq!(public.save_groups, vec![0, 1]);
        assert_eq!(public.suggested, Some(1));
    }

    #[test]
    #[should_panic(expected = "membership must be given for each group")]
    fn parts_must_have_matching_lengths() {
        ReleaseState::from_parts(vec![group(A, "A"), Group::ReadOnly], A, vec![true]);
    }
}
