//! In-memory implementation of the store interfaces.
//!
//! All data is kept in a single arena guarded by a read-write lock. Every
//! operation takes the lock once, so each of them is atomic with respect to
//! all others.

use chrono::NaiveDateTime;
use std::{
    collections::{BTreeMap, BTreeSet},
    convert::TryFrom,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    models::{
        AccessRule,
        Group,
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
        group::EVERYONE,
        version::RELEASED,
    },
    permissions::Permission,
};
use super::{Admin, Record, Released, Store, StoreError};

/// Store keeping all data in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

#[derive(Debug, Default)]
struct Data {
    next_id: i32,
    nodes: BTreeMap<NodeId, NodeData>,
    groups: BTreeMap<GroupId, StoredGroup>,
    members: BTreeSet<(GroupId, UserId)>,
    /// Permission levels are kept raw, as a database would.
    rules: BTreeMap<(NodeId, GroupId), i32>,
    workflows: BTreeMap<WorkflowId, (String, Vec<GroupId>)>,
    versions: BTreeMap<(NodeId, i32), Version>,
}

#[derive(Debug)]
struct NodeData {
    node: Node,
    workflow: Option<WorkflowId>,
    children_workflow: Option<WorkflowId>,
    index: NodeIndex,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Store an access rule with an arbitrary permission level, bypassing
    /// validation the same way a hand-edited database would.
    pub fn set_raw_access_rule(&self, node: NodeId, group: GroupId, level: i32) {
        self.write().rules.insert((node, group), level);
    }

    fn read(&self) -> RwLockReadGuard<Data> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<Data> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl Data {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, StoreError> {
        self.nodes.get(&id).ok_or(StoreError::NotFound(Record::Node(id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, StoreError> {
        self.nodes.get_mut(&id).ok_or(StoreError::NotFound(Record::Node(id)))
    }

    fn group(&self, id: GroupId) -> Result<&StoredGroup, StoreError> {
        self.groups.get(&id).ok_or(StoreError::NotFound(Record::Group(id)))
    }

    /// Ensure every ID names either everyone or an existing group.
    fn check_groups(&self, ids: &[GroupId]) -> Result<(), StoreError> {
        for &id in ids {
            if id != EVERYONE {
                self.group(id)?;
            }
        }
        Ok(())
    }

    fn workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        let (name, ids) = self.workflows.get(&id)
            .ok_or(StoreError::NotFound(Record::Workflow(id)))?;

        let groups = ids.iter()
            .map(|&group| match group {
                EVERYONE => Ok(Group::Everyone),
                _ => self.group(group).map(|g| Group::Stored(g.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Workflow::new(id, name.clone(), groups))
    }

    /// Recompute the newest released version of a node.
    fn recompute_released(&mut self, node: NodeId) -> Result<Released, StoreError> {
        let current = self.versions.range((node, 0)..=(node, i32::max_value()))
            .filter(|(_, version)| version.workflow_group == RELEASED)
            .map(|(&(_, number), _)| number)
            .max()
            .unwrap_or(0);

        let data = self.node_mut(node)?;
        let previous = data.node.max_released_version;
        data.node.max_released_version = current;

        Ok(Released { previous, current })
    }
}

impl Store for MemoryStore {
    fn node(&self, id: NodeId) -> Result<Node, StoreError> {
        self.read().node(id).map(|data| data.node.clone())
    }

    fn access_rules(&self, node: NodeId) -> Result<Vec<AccessRule>, StoreError> {
        let data = self.read();
        data.node(node)?;

        data.rules.range((node, GroupId::min_value())..=(node, GroupId::max_value()))
            .map(|(&(node, group), &level)| -> Result<_, StoreError> {
                Ok(AccessRule {
                    node,
                    group,
                    permission: Permission::try_from(level)?,
                })
            })
            .collect()
    }

    fn group(&self, id: GroupId) -> Result<StoredGroup, StoreError> {
        self.read().group(id).map(Clone::clone)
    }

    fn groups_of(&self, user: UserId) -> Result<Vec<StoredGroup>, StoreError> {
        let data = self.read();

        data.members.iter()
            .filter(|&&(_, member)| member == user)
            .map(|&(group, _)| data.group(group).map(Clone::clone))
            .collect()
    }

    fn is_member(&self, group: GroupId, user: UserId) -> Result<bool, StoreError> {
        Ok(self.read().members.contains(&(group, user)))
    }

    fn members(&self, group: GroupId) -> Result<Vec<UserId>, StoreError> {
        let data = self.read();
        data.group(group)?;

        Ok(data.members.range((group, UserId::min_value())..=(group, UserId::max_value()))
            .map(|&(_, user)| user)
            .collect())
    }

    fn assigned_workflow(&self, node: NodeId, children_only: bool)
    -> Result<Option<WorkflowId>, StoreError> {
        let data = self.read();
        let node = data.node(node)?;

        Ok(if children_only { node.children_workflow } else { node.workflow })
    }

    fn workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        self.read().workflow(id)
    }

    fn version(&self, node: NodeId, number: i32) -> Result<Version, StoreError> {
        self.read().versions.get(&(node, number))
            .cloned()
            .ok_or(StoreError::NotFound(Record::Version(node, number)))
    }

    fn versions(&self, node: NodeId) -> Result<Vec<Version>, StoreError> {
        let data = self.read();
        data.node(node)?;

        Ok(data.versions.range((node, 0)..=(node, i32::max_value()))
            .rev()
            .map(|(_, version)| version.clone())
            .collect())
    }

    fn set_workflow_group(&self, node: NodeId, number: i32, group: GroupId)
    -> Result<Released, StoreError> {
        let mut data = self.write();

        data.versions.get_mut(&(node, number))
            .ok_or(StoreError::NotFound(Record::Version(node, number)))?
            .workflow_group = group;

        data.recompute_released(node)
    }

    fn insert_version(&self, node: NodeId, new: &NewVersion, changed: NaiveDateTime)
    -> Result<(Version, Released), StoreError> {
        let mut data = self.write();

        let entry = data.node_mut(node)?;
        entry.node.max_version += 1;
        let number = entry.node.max_version;

        let version = Version {
            node,
            number,
            changed,
            note: new.note.clone(),
            content: new.content.clone(),
            workflow_group: new.workflow_group,
        };
        data.versions.insert((node, number), version.clone());

        let released = data.recompute_released(node)?;

        Ok((version, released))
    }

    fn node_index(&self, node: NodeId) -> Result<NodeIndex, StoreError> {
        self.read().node(node).map(|data| data.index.clone())
    }

    fn set_node_index(&self, node: NodeId, index: &NodeIndex) -> Result<(), StoreError> {
        self.write().node_mut(node)?.index = index.clone();
        Ok(())
    }
}

impl Admin for MemoryStore {
    fn groups(&self) -> Result<Vec<StoredGroup>, StoreError> {
        Ok(self.read().groups.values().cloned().collect())
    }

    fn create_group(&self, name: &str) -> Result<StoredGroup, StoreError> {
        let mut data = self.write();
        let id = data.next_id();
        let group = StoredGroup { id, name: name.to_string() };
        data.groups.insert(id, group.clone());
        Ok(group)
    }

    fn rename_group(&self, id: GroupId, name: &str) -> Result<(), StoreError> {
        self.write().groups.get_mut(&id)
            .ok_or(StoreError::NotFound(Record::Group(id)))?
            .name = name.to_string();
        Ok(())
    }

    fn delete_group(&self, id: GroupId) -> Result<(), StoreError> {
        let mut data = self.write();

        data.groups.remove(&id).ok_or(StoreError::NotFound(Record::Group(id)))?;
        data.members.retain(|&(group, _)| group != id);
        data.rules.retain(|&(_, group), _| group != id);
        for (_, groups) in data.workflows.values_mut() {
            groups.retain(|&group| group != id);
        }

        Ok(())
    }

    fn add_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError> {
        let mut data = self.write();
        data.group(group)?;
        data.members.insert((group, user));
        Ok(())
    }

    fn remove_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError> {
        self.write().members.remove(&(group, user));
        Ok(())
    }

    fn nodes(&self) -> Result<Vec<Node>, StoreError> {
        Ok(self.read().nodes.values().map(|data| data.node.clone()).collect())
    }

    fn children(&self, node: NodeId) -> Result<Vec<Node>, StoreError> {
        let data = self.read();
        data.node(node)?;

        Ok(data.nodes.values()
            .filter(|data| data.node.parent == Some(node))
            .map(|data| data.node.clone())
            .collect())
    }

    fn create_node(&self, parent: Option<NodeId>, slug: &str, class: &str)
    -> Result<Node, StoreError> {
        let mut data = self.write();

        if let Some(parent) = parent {
            data.node(parent)?;
        }

        let node = Node {
            id: data.next_id(),
            parent,
            slug: slug.to_string(),
            class: class.to_string(),
            max_version: 0,
            max_released_version: 0,
        };

        data.nodes.insert(node.id, NodeData {
            node: node.clone(),
            workflow: None,
            children_workflow: None,
            index: NodeIndex::default(),
        });

        Ok(node)
    }

    fn set_parent(&self, node: NodeId, parent: Option<NodeId>) -> Result<(), StoreError> {
        let mut data = self.write();

        if let Some(parent) = parent {
            data.node(parent)?;
        }

        data.node_mut(node)?.node.parent = parent;
        Ok(())
    }

    fn delete_node(&self, node: NodeId) -> Result<(), StoreError> {
        let mut data = self.write();

        data.nodes.remove(&node).ok_or(StoreError::NotFound(Record::Node(node)))?;
        data.rules.retain(|&(rule_node, _), _| rule_node != node);
        data.versions.retain(|&(version_node, _), _| version_node != node);

        Ok(())
    }

    fn set_access_rule(&self, node: NodeId, group: GroupId, permission: Permission)
    -> Result<(), StoreError> {
        let mut data = self.write();
        data.node(node)?;
        data.rules.insert((node, group), permission.value());
        Ok(())
    }

    fn remove_access_rule(&self, node: NodeId, group: GroupId) -> Result<(), StoreError> {
        self.write().rules.remove(&(node, group));
        Ok(())
    }

    fn workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        let data = self.read();
        data.workflows.keys().map(|&id| data.workflow(id)).collect()
    }

    fn create_workflow(&self, name: &str, groups: &[GroupId])
    -> Result<Workflow, StoreError> {
        let mut data = self.write();
        data.check_groups(groups)?;
        let id = data.next_id();
        data.workflows.insert(id, (name.to_string(), groups.to_vec()));
        data.workflow(id)
    }

    fn set_workflow_groups(&self, id: WorkflowId, groups: &[GroupId])
    -> Result<(), StoreError> {
        let mut data = self.write();
        data.check_groups(groups)?;
        data.workflows.get_mut(&id)
            .ok_or(StoreError::NotFound(Record::Workflow(id)))?
            .1 = groups.to_vec();
        Ok(())
    }

    fn assign_workflow(
        &self,
        node: NodeId,
        workflow: Option<WorkflowId>,
        children_only: bool,
    ) -> Result<(), StoreError> {
        let mut data = self.write();

        if let Some(id) = workflow {
            if !data.workflows.contains_key(&id) {
                return Err(StoreError::NotFound(Record::Workflow(id)));
            }
        }

        let node = data.node_mut(node)?;
        if children_only {
            node.children_workflow = workflow;
        } else {
            node.workflow = workflow;
        }

        Ok(())
    }
}
