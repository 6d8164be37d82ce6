use failure::Fail;
use log::trace;
use serde::Serialize;

use crate::{
    ApiError,
    store::{Store, StoreError},
};
use super::{Group, GroupId, NodeId, group::PublicData as GroupData, node::Ancestors};

/// Identifier of a workflow.
pub type WorkflowId = i32;

/// An ordered chain of groups a version has to pass through before it is
/// released.
///
/// A workflow is always loaded with all its groups resolved. It is a snapshot:
/// changes made to the workflow after it was loaded are not reflected, and
/// a fresh copy has to be loaded to see them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    groups: Vec<Group>,
}

/// A subset of workflow's data that can safely be publicly exposed.
#[derive(Debug, Serialize)]
pub struct PublicData {
    pub id: WorkflowId,
    pub name: String,
    pub groups: Vec<GroupData>,
}

impl Workflow {
    pub fn new(id: WorkflowId, name: String, groups: Vec<Group>) -> Workflow {
        Workflow { id, name, groups }
    }

    /// Load a workflow by ID.
    pub fn by_id<S>(store: &S, id: WorkflowId) -> Result<Workflow, StoreError>
    where
        S: Store + ?Sized,
    {
        store.workflow(id)
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Groups of this workflow, in order. Duplicates are allowed and the list
    /// may be empty.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(Group::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    /// Get public portion of this workflow's data.
    pub fn get_public(&self) -> PublicData {
        PublicData {
            id: self.id,
            name: self.name.clone(),
            groups: self.groups.iter().map(Group::get_public).collect(),
        }
    }
}

/// Find the workflow governing a node.
///
/// A workflow assigned directly to a node governs it. Otherwise the workflow
/// its parent assigned to its children applies, and failing that the one
/// governing the parent.
pub fn effective_workflow<S>(store: &S, node: NodeId)
-> Result<Workflow, FindWorkflowError>
where
    S: Store + ?Sized,
{
    for current in Ancestors::from_id(store, node) {
        let current = current?;

        if let Some(id) = store.assigned_workflow(current.id, false)? {
            trace!("Node {} uses workflow {} assigned to node {}",
                node, id, current.id);
            return Ok(store.workflow(id)?);
        }

        let parent = match current.parent {
            Some(parent) => parent,
            None => break,
        };

        if let Some(id) = store.assigned_workflow(parent, true)? {
            trace!("Node {} uses workflow {} assigned to children of node {}",
                node, id, parent);
            return Ok(store.workflow(id)?);
        }
    }

    Err(FindWorkflowError::NoWorkflow(node))
}

#[derive(ApiError, Debug, Fail)]
pub enum FindWorkflowError {
    /// Neither the node nor any of its ancestors have a workflow assigned.
    #[fail(display = "No workflow governs node {}", _0)]
    #[api(code = "workflow:none", status = "INTERNAL_SERVER_ERROR")]
    NoWorkflow(NodeId),
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for FindWorkflowError ;
    StoreError => |e| FindWorkflowError::Store(e),
}
