//! Creating versions and moving them through workflows.
//!
//! Each of the operations here first gates the request on the user's access
//! to the node and on their place in its workflow, then applies the change
//! through the store, and finally, if the newest released version of the node
//! changed as a result, recomputes its [index data][crate::models::NodeIndex].

use chrono::Utc;
use failure::Fail;
use log::{debug, info};

use crate::{
    ApiError,
    access::{CheckPermissionError, check_permission},
    models::{GroupId, NewVersion, NodeId, NodeIndex, UserId, Version, version::RELEASED},
    permissions::Permission,
    processing::{self, ProcessingError},
    release::{ReleaseState, ReleaseStateError},
    store::{Released, Store, StoreError},
};

/// Move a version to another workflow group.
///
/// This performs no authorization and is intended for administrative use;
/// [`release_version()`] and [`revoke_version()`] are the user-facing
/// variants. Returns `false` if the version already was in `group`.
///
/// Index data the node will publish after the change is computed first, so
/// a version whose content can't be indexed is never released.
pub fn set_workflow_group<S>(store: &S, node: NodeId, version: i32, group: GroupId)
-> Result<bool, EditError>
where
    S: Store + ?Sized,
{
    let current = store.version(node, version)?;

    if current.workflow_group == group {
        debug!("Version {} of node {} already in group {}", version, node, group);
        return Ok(false);
    }

    let prepared = prepare_index(store, node, version, group)?;
    let released = store.set_workflow_group(node, version, group)?;
    reindex(store, node, released, prepared)?;

    Ok(true)
}

/// Save a new version of a node.
///
/// The user must be an editor of the node, and `new.workflow_group` must be
/// one of their [save groups][ReleaseState::save_groups].
pub fn save_version<S>(
    store: &S,
    node: NodeId,
    user: Option<UserId>,
    new: &NewVersion,
) -> Result<Version, EditError>
where
    S: Store + ?Sized,
{
    check_permission(store, node, user, Permission::Read)?;

    let state = ReleaseState::for_node(store, node, user)?;

    if !state.can_edit() {
        return Err(EditError::NotEditor(node));
    }

    if !state.is_save_group(new.workflow_group) {
        return Err(EditError::InvalidGroup(new.workflow_group));
    }

    // Reject content which couldn't be indexed once released.
    processing::front_matter(&new.content)?;

    let now = Utc::now().naive_utc();
    let (version, released) = store.insert_version(node, new, now)?;

    info!("Saved version {} of node {} into group {}",
        version.number, node, version.workflow_group);

    reindex(store, node, released, None)?;

    Ok(version)
}

/// Move a version forward in its workflow, as far as the user can.
///
/// Returns ID of the group now holding the version.
pub fn release_version<S>(store: &S, node: NodeId, version: i32, user: Option<UserId>)
-> Result<GroupId, EditError>
where
    S: Store + ?Sized,
{
    let state = editor_state(store, node, version, user)?;
    let target = state.release_to_group()
        .ok_or(EditError::NoTransition)?
        .id();

    set_workflow_group(store, node, version, target)?;
    Ok(target)
}

/// Move a version back in its workflow, to the nearest group the user is
/// a member of.
///
/// Returns ID of the group now holding the version.
pub fn revoke_version<S>(store: &S, node: NodeId, version: i32, user: Option<UserId>)
-> Result<GroupId, EditError>
where
    S: Store + ?Sized,
{
    let state = editor_state(store, node, version, user)?;
    let target = state.revoke_to_group()
        .ok_or(EditError::NoTransition)?
        .id();

    set_workflow_group(store, node, version, target)?;
    Ok(target)
}

fn editor_state<S>(store: &S, node: NodeId, version: i32, user: Option<UserId>)
-> Result<ReleaseState, EditError>
where
    S: Store + ?Sized,
{
    check_permission(store, node, user, Permission::Read)?;

    let state = ReleaseState::for_version(store, node, version, user)?;

    if state.can_edit() {
        Ok(state)
    } else {
        Err(EditError::NotEditor(node))
    }
}

/// Compute index data a node will publish once `version` is moved to
/// `group`.
///
/// Returns the number of the version that will be published together with
/// its index data, or `None` if the published version won't change.
fn prepare_index<S>(store: &S, node: NodeId, version: i32, group: GroupId)
-> Result<Option<(i32, NodeIndex)>, EditError>
where
    S: Store + ?Sized,
{
    let published = store.node(node)?.max_released_version;
    let next = store.versions(node)?
        .into_iter()
        .find(|v| if v.number == version {
            group == RELEASED
        } else {
            v.workflow_group == RELEASED
        });

    match next {
        Some(ref v) if v.number == published => Ok(None),
        Some(v) => Ok(Some((v.number, processing::index_version(&v)?))),
        None if published == 0 => Ok(None),
        None => Ok(Some((0, NodeIndex::default()))),
    }
}

/// Store index data of a node after its newest released version changed.
///
/// `prepared` is used when it matches the version now published. Otherwise
/// (another change committed in between, or nothing was prepared) index data
/// is computed here, after the change is already committed; should that
/// fail the node keeps its previous index data until the next change.
fn reindex<S>(
    store: &S,
    node: NodeId,
    released: Released,
    prepared: Option<(i32, NodeIndex)>,
) -> Result<(), EditError>
where
    S: Store + ?Sized,
{
    if !released.changed() {
        return Ok(());
    }

    let index = match prepared {
        Some((number, index)) if number == released.current => index,
        _ if released.current == 0 => NodeIndex::default(),
        _ => processing::index_version(&store.version(node, released.current)?)?,
    };

    store.set_node_index(node, &index)?;

    info!("Node {} now publishes version {} (was {})",
        node, released.current, released.previous);

    Ok(())
}

#[derive(ApiError, Debug, Fail)]
pub enum EditError {
    #[fail(display = "{}", _0)]
    Access(#[cause] CheckPermissionError),
    /// User is not a member of any group of the node's workflow.
    #[fail(display = "User cannot edit node {}", _0)]
    #[api(code = "node:edit:forbidden", status = "FORBIDDEN")]
    NotEditor(NodeId),
    /// User can't save a version into this group.
    #[fail(display = "Cannot save into group {}", _0)]
    #[api(code = "version:group:invalid", status = "BAD_REQUEST")]
    InvalidGroup(GroupId),
    /// There is no group the user could move this version to.
    #[fail(display = "Version cannot be moved")]
    #[api(code = "version:no-transition", status = "BAD_REQUEST")]
    NoTransition,
    #[fail(display = "{}", _0)]
    Processing(#[cause] ProcessingError),
    #[fail(display = "{}", _0)]
    ReleaseState(#[cause] ReleaseStateError),
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for EditError ;
    CheckPermissionError => |e| EditError::Access(e),
    ProcessingError => |e| EditError::Processing(e),
    ReleaseStateError => |e| EditError::ReleaseState(e),
    StoreError => |e| EditError::Store(e),
}
