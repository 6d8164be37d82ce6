//! Data and behaviours modelled as objects.

pub mod group;
pub mod node;
pub mod rule;
pub mod version;
pub mod workflow;

pub use self::{
    group::{Group, GroupError, GroupId, StoredGroup},
    node::{Ancestors, Node, NodeId, NodeIndex},
    rule::AccessRule,
    version::{NewVersion, Version},
    workflow::{FindWorkflowError, Workflow, WorkflowId, effective_workflow},
};

/// Identifier of a user.
///
/// Users themselves are managed by an external identity service; this crate
/// only ever sees their IDs. A request made without an identity is
/// represented as `None` wherever an `Option<UserId>` is taken.
pub type UserId = i32;
