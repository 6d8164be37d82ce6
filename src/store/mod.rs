//! Interface to the persistence layer.
//!
//! Resolvers in this crate never talk to a database directly. Instead they
//! consume the narrow [`Store`] interface, which is implemented for
//! PostgreSQL connections in [`crate::db`] and in memory in [`memory`].
//! Administrative create/update/delete primitives, which the resolvers don't
//! need, live in [`Admin`].

use chrono::NaiveDateTime;
use diesel::result::Error as DbError;
use failure::Fail;
use std::fmt;

use crate::{
    ApiError,
    models::{
        AccessRule,
        GroupId,
        NewVersion,
        Node,
        NodeId,
        NodeIndex,
        StoredGroup,
        UserId,
        Version,
        Workflow,
        WorkflowId,
    },
    permissions::{InvalidPermissionValue, Permission},
};

pub mod memory;

/// Read access to the content tree, plus the two mutations which the editing
/// operations need to be atomic.
pub trait Store {
    /// Find a node by ID.
    fn node(&self, id: NodeId) -> Result<Node, StoreError>;

    /// Get all access rules set directly on a node.
    fn access_rules(&self, node: NodeId) -> Result<Vec<AccessRule>, StoreError>;

    /// Find a stored group by ID.
    fn group(&self, id: GroupId) -> Result<StoredGroup, StoreError>;

    /// Get all stored groups a user is a member of.
    fn groups_of(&self, user: UserId) -> Result<Vec<StoredGroup>, StoreError>;

    /// Check whether a user is a member of a stored group.
    fn is_member(&self, group: GroupId, user: UserId) -> Result<bool, StoreError>;

    /// Get all members of a stored group.
    fn members(&self, group: GroupId) -> Result<Vec<UserId>, StoreError>;

    /// Get the workflow assigned to a node. With `children_only` this is the
    /// workflow assigned to the node's descendants, otherwise the one
    /// assigned to the node itself.
    fn assigned_workflow(&self, node: NodeId, children_only: bool)
    -> Result<Option<WorkflowId>, StoreError>;

    /// Load a workflow with all its groups resolved.
    fn workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError>;

    /// Find a version of a node.
    fn version(&self, node: NodeId, number: i32) -> Result<Version, StoreError>;

    /// Get all versions of a node, newest first.
    fn versions(&self, node: NodeId) -> Result<Vec<Version>, StoreError>;

    /// Change the workflow group holding a version.
    ///
    /// In the same atomic unit the node's newest released version is
    /// recomputed, so that no reader can observe one change without the
    /// other.
    fn set_workflow_group(&self, node: NodeId, number: i32, group: GroupId)
    -> Result<Released, StoreError>;

    /// Create a new version of a node, numbered one past its current newest
    /// version.
    ///
    /// Like [`Store::set_workflow_group()`] this recomputes the node's newest
    /// released version atomically with the insert.
    fn insert_version(&self, node: NodeId, version: &NewVersion, changed: NaiveDateTime)
    -> Result<(Version, Released), StoreError>;

    /// Get index data of a node.
    fn node_index(&self, node: NodeId) -> Result<NodeIndex, StoreError>;

    /// Replace index data of a node.
    fn set_node_index(&self, node: NodeId, index: &NodeIndex) -> Result<(), StoreError>;
}

/// Create, update, and delete primitives for the content tree.
///
/// These are plain pass-through operations without any authorization or
/// validation of their own; see [`crate::tree`] for validated variants.
pub trait Admin: Store {
    /// Get all stored groups.
    fn groups(&self) -> Result<Vec<StoredGroup>, StoreError>;

    fn create_group(&self, name: &str) -> Result<StoredGroup, StoreError>;

    fn rename_group(&self, id: GroupId, name: &str) -> Result<(), StoreError>;

    /// Delete a group together with its memberships, access rules naming it,
    /// and its positions in workflows.
    fn delete_group(&self, id: GroupId) -> Result<(), StoreError>;

    fn add_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError>;

    fn remove_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError>;

    /// Get all nodes.
    fn nodes(&self) -> Result<Vec<Node>, StoreError>;

    /// Get all direct children of a node.
    fn children(&self, node: NodeId) -> Result<Vec<Node>, StoreError>;

    fn create_node(&self, parent: Option<NodeId>, slug: &str, class: &str)
    -> Result<Node, StoreError>;

    fn set_parent(&self, node: NodeId, parent: Option<NodeId>) -> Result<(), StoreError>;

    /// Delete a node together with its versions, access rules, and index data.
    fn delete_node(&self, node: NodeId) -> Result<(), StoreError>;

    /// Create or replace the access rule for a group on a node.
    fn set_access_rule(&self, node: NodeId, group: GroupId, permission: Permission)
    -> Result<(), StoreError>;

    fn remove_access_rule(&self, node: NodeId, group: GroupId) -> Result<(), StoreError>;

    /// Get all workflows.
    fn workflows(&self) -> Result<Vec<Workflow>, StoreError>;

    /// Create a workflow. Every group must be [`EVERYONE`] or an existing
    /// group, otherwise nothing is created.
    ///
    /// [`EVERYONE`]: crate::models::group::EVERYONE
    fn create_workflow(&self, name: &str, groups: &[GroupId])
    -> Result<Workflow, StoreError>;

    /// Replace the list of groups of a workflow. Groups are checked the same
    /// way as in [`Admin::create_workflow()`].
    fn set_workflow_groups(&self, id: WorkflowId, groups: &[GroupId])
    -> Result<(), StoreError>;

    /// Assign a workflow to a node, or with `None` remove the assignment.
    fn assign_workflow(
        &self,
        node: NodeId,
        workflow: Option<WorkflowId>,
        children_only: bool,
    ) -> Result<(), StoreError>;
}

/// Newest released version of a node before and after a change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Released {
    pub previous: i32,
    pub current: i32,
}

impl Released {
    /// Did publicly visible content of the node change?
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// A stored record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Record {
    Node(NodeId),
    Group(GroupId),
    Workflow(WorkflowId),
    Version(NodeId, i32),
}

impl fmt::Display for Record {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Record::Node(id) => write!(fmt, "node {}", id),
            Record::Group(id) => write!(fmt, "group {}", id),
            Record::Workflow(id) => write!(fmt, "workflow {}", id),
            Record::Version(node, number) =>
                write!(fmt, "version {} of node {}", number, node),
        }
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum StoreError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Database(#[cause] DbError),
    /// Error connecting to database.
    #[fail(display = "Cannot connect to database: {}", _0)]
    #[api(internal)]
    Connection(#[cause] diesel::ConnectionError),
    /// No record matching given criteria.
    #[fail(display = "No such {}", _0)]
    #[api(code = "not-found", status = "NOT_FOUND")]
    NotFound(Record),
    /// A stored permission level is not one of the known levels.
    #[fail(display = "{}", _0)]
    #[api(internal)]
    InvalidPermission(#[cause] InvalidPermissionValue),
    /// Parent links of stored nodes form a cycle.
    #[fail(display = "Node {} is its own ancestor", _0)]
    #[api(internal)]
    Cycle(NodeId),
}

impl_from! { for StoreError ;
    DbError => |e| StoreError::Database(e),
    diesel::ConnectionError => |e| StoreError::Connection(e),
    InvalidPermissionValue => |e| StoreError::InvalidPermission(e),
}
