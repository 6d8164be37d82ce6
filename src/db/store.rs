use chrono::NaiveDateTime;
use diesel::{
    Connection as _,
    dsl::max,
    prelude::*,
};
use std::{collections::HashMap, convert::TryFrom};

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
    store::{Admin, Record, Released, Store, StoreError},
};
use super::{
    Connection,
    models as db,
    schema::{
        access_rules,
        group_members,
        groups,
        node_tags,
        nodes,
        versions,
        workflow_groups,
        workflows,
    },
};

impl From<db::Node> for Node {
    fn from(data: db::Node) -> Node {
        Node {
            id: data.id,
            parent: data.parent,
            slug: data.slug,
            class: data.class,
            max_version: data.max_version,
            max_released_version: data.max_released_version,
        }
    }
}

impl From<db::Group> for StoredGroup {
    fn from(data: db::Group) -> StoredGroup {
        StoredGroup { id: data.id, name: data.name }
    }
}

impl From<db::Version> for Version {
    fn from(data: db::Version) -> Version {
        Version {
            node: data.node,
            number: data.version,
            changed: data.changed,
            note: data.note,
            content: data.content,
            workflow_group: data.workflow_group,
        }
    }
}

impl TryFrom<db::AccessRule> for AccessRule {
    type Error = StoreError;

    fn try_from(data: db::AccessRule) -> Result<AccessRule, StoreError> {
        Ok(AccessRule {
            node: data.node,
            group: data.group,
            permission: Permission::try_from(data.permission)?,
        })
    }
}

/// Recompute the newest released version of a node.
///
/// This must be called within the same transaction as the change which
/// requires it.
fn recompute_released(dbcon: &Connection, node: NodeId) -> Result<Released, StoreError> {
    let previous = nodes::table
        .filter(nodes::id.eq(node))
        .select(nodes::max_released_version)
        .get_result::<i32>(dbcon)
        .optional()?
        .ok_or(StoreError::NotFound(Record::Node(node)))?;

    let current = versions::table
        .filter(versions::node.eq(node)
            .and(versions::workflow_group.eq(RELEASED)))
        .select(max(versions::version))
        .get_result::<Option<i32>>(dbcon)?
        .unwrap_or(0);

    if current != previous {
        diesel::update(nodes::table.filter(nodes::id.eq(node)))
            .set(nodes::max_released_version.eq(current))
            .execute(dbcon)?;
    }

    Ok(Released { previous, current })
}

/// Load a workflow and resolve its groups.
fn load_workflow(dbcon: &Connection, data: db::Workflow) -> Result<Workflow, StoreError> {
    let ids = workflow_groups::table
        .filter(workflow_groups::workflow.eq(data.id))
        .order_by(workflow_groups::position.asc())
        .select(workflow_groups::group)
        .get_results::<i32>(dbcon)?;

    let stored = groups::table
        .filter(groups::id.eq_any(&ids))
        .get_results::<db::Group>(dbcon)?
        .into_iter()
        .map(|group| (group.id, StoredGroup::from(group)))
        .collect::<HashMap<_, _>>();

    let groups = ids.into_iter()
        .map(|id| match id {
            EVERYONE => Ok(Group::Everyone),
            _ => stored.get(&id)
                .cloned()
                .map(Group::Stored)
                .ok_or(StoreError::NotFound(Record::Group(id))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Workflow::new(data.id, data.name, groups))
}

/// Ensure every ID names either everyone or an existing group.
fn check_groups(dbcon: &Connection, ids: &[GroupId]) -> Result<(), StoreError> {
    let stored = ids.iter()
        .cloned()
        .filter(|&id| id != EVERYONE)
        .collect::<Vec<_>>();

    if stored.is_empty() {
        return Ok(());
    }

    let found = groups::table
        .filter(groups::id.eq_any(&stored))
        .select(groups::id)
        .get_results::<i32>(dbcon)?;

    match stored.into_iter().find(|id| !found.contains(id)) {
        Some(id) => Err(StoreError::NotFound(Record::Group(id))),
        None => Ok(()),
    }
}

fn insert_workflow_groups(dbcon: &Connection, workflow: WorkflowId, groups: &[GroupId])
-> Result<(), StoreError> {
    let rows = groups.iter()
        .enumerate()
        .map(|(position, &group)| db::WorkflowGroup {
            workflow,
            position: position as i32,
            group,
        })
        .collect::<Vec<_>>();

    if !rows.is_empty() {
        diesel::insert_into(workflow_groups::table)
            .values(&rows)
            .execute(dbcon)?;
    }

    Ok(())
}

impl Store for Connection {
    fn node(&self, id: NodeId) -> Result<Node, StoreError> {
        nodes::table
            .filter(nodes::id.eq(id))
            .get_result::<db::Node>(self)
            .optional()?
            .map(Node::from)
            .ok_or(StoreError::NotFound(Record::Node(id)))
    }

    fn access_rules(&self, node: NodeId) -> Result<Vec<AccessRule>, StoreError> {
        access_rules::table
            .filter(access_rules::node.eq(node))
            .get_results::<db::AccessRule>(self)?
            .into_iter()
            .map(AccessRule::try_from)
            .collect()
    }

    fn group(&self, id: GroupId) -> Result<StoredGroup, StoreError> {
        groups::table
            .filter(groups::id.eq(id))
            .get_result::<db::Group>(self)
            .optional()?
            .map(StoredGroup::from)
            .ok_or(StoreError::NotFound(Record::Group(id)))
    }

    fn groups_of(&self, user: UserId) -> Result<Vec<StoredGroup>, StoreError> {
        Ok(groups::table
            .inner_join(group_members::table)
            .filter(group_members::user.eq(user))
            .select(groups::all_columns)
            .order_by(groups::id.asc())
            .get_results::<db::Group>(self)?
            .into_iter()
            .map(StoredGroup::from)
            .collect())
    }

    fn is_member(&self, group: GroupId, user: UserId) -> Result<bool, StoreError> {
        diesel::select(diesel::dsl::exists(group_members::table
            .filter(group_members::group.eq(group)
                .and(group_members::user.eq(user)))))
            .get_result::<bool>(self)
            .map_err(From::from)
    }

    fn members(&self, group: GroupId) -> Result<Vec<UserId>, StoreError> {
        self.group(group)?;

        group_members::table
            .filter(group_members::group.eq(group))
            .select(group_members::user)
            .order_by(group_members::user.asc())
            .get_results::<i32>(self)
            .map_err(From::from)
    }

    fn assigned_workflow(&self, node: NodeId, children_only: bool)
    -> Result<Option<WorkflowId>, StoreError> {
        let query = nodes::table.filter(nodes::id.eq(node));

        let workflow = if children_only {
            query.select(nodes::children_workflow).get_result::<Option<i32>>(self)
        } else {
            query.select(nodes::workflow).get_result::<Option<i32>>(self)
        };

        workflow.optional()?.ok_or(StoreError::NotFound(Record::Node(node)))
    }

    fn workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        let data = workflows::table
            .filter(workflows::id.eq(id))
            .get_result::<db::Workflow>(self)
            .optional()?
            .ok_or(StoreError::NotFound(Record::Workflow(id)))?;

        load_workflow(self, data)
    }

    fn version(&self, node: NodeId, number: i32) -> Result<Version, StoreError> {
        versions::table
            .filter(versions::node.eq(node)
                .and(versions::version.eq(number)))
            .get_result::<db::Version>(self)
            .optional()?
            .map(Version::from)
            .ok_or(StoreError::NotFound(Record::Version(node, number)))
    }

    fn versions(&self, node: NodeId) -> Result<Vec<Version>, StoreError> {
        self.node(node)?;

        Ok(versions::table
            .filter(versions::node.eq(node))
            .order_by(versions::version.desc())
            .get_results::<db::Version>(self)?
            .into_iter()
            .map(Version::from)
            .collect())
    }

    fn set_workflow_group(&self, node: NodeId, number: i32, group: GroupId)
    -> Result<Released, StoreError> {
        self.transaction(|| {
            let updated = diesel::update(versions::table
                .filter(versions::node.eq(node)
                    .and(versions::version.eq(number))))
                .set(versions::workflow_group.eq(group))
                .execute(self)?;

            if updated == 0 {
                return Err(StoreError::NotFound(Record::Version(node, number)));
            }

            recompute_released(self, node)
        })
    }

    fn insert_version(&self, node: NodeId, new: &NewVersion, changed: NaiveDateTime)
    -> Result<(Version, Released), StoreError> {
        self.transaction(|| {
            let latest = nodes::table
                .filter(nodes::id.eq(node))
                .select(nodes::max_version)
                .get_result::<i32>(self)
                .optional()?
                .ok_or(StoreError::NotFound(Record::Node(node)))?;

            let version = diesel::insert_into(versions::table)
                .values(db::NewVersion {
                    node,
                    version: latest + 1,
                    changed,
                    note: &new.note,
                    content: &new.content,
                    workflow_group: new.workflow_group,
                })
                .get_result::<db::Version>(self)?;

            diesel::update(nodes::table.filter(nodes::id.eq(node)))
                .set(nodes::max_version.eq(version.version))
                .execute(self)?;

            let released = recompute_released(self, node)?;

            Ok((Version::from(version), released))
        })
    }

    fn node_index(&self, node: NodeId) -> Result<NodeIndex, StoreError> {
        let timestamp = nodes::table
            .filter(nodes::id.eq(node))
            .select(nodes::indexed_at)
            .get_result::<Option<NaiveDateTime>>(self)
            .optional()?
            .ok_or(StoreError::NotFound(Record::Node(node)))?;

        let tags = node_tags::table
            .filter(node_tags::node.eq(node))
            .select(node_tags::tag)
            .order_by(node_tags::tag.asc())
            .get_results::<String>(self)?;

        Ok(NodeIndex { tags, timestamp })
    }

    fn set_node_index(&self, node: NodeId, index: &NodeIndex) -> Result<(), StoreError> {
        self.transaction(|| {
            let updated = diesel::update(nodes::table.filter(nodes::id.eq(node)))
                .set(nodes::indexed_at.eq(index.timestamp))
                .execute(self)?;

            if updated == 0 {
                return Err(StoreError::NotFound(Record::Node(node)));
            }

            diesel::delete(node_tags::table.filter(node_tags::node.eq(node)))
                .execute(self)?;

            let tags = index.tags.iter()
                .map(|tag| db::NewNodeTag { node, tag })
                .collect::<Vec<_>>();

            if !tags.is_empty() {
                diesel::insert_into(node_tags::table)
                    .values(&tags)
                    .execute(self)?;
            }

            Ok(())
        })
    }
}

impl Admin for Connection {
    fn groups(&self) -> Result<Vec<StoredGroup>, StoreError> {
        Ok(groups::table
            .order_by(groups::id.asc())
            .get_results::<db::Group>(self)?
            .into_iter()
            .map(StoredGroup::from)
            .collect())
    }

    fn create_group(&self, name: &str) -> Result<StoredGroup, StoreError> {
        diesel::insert_into(groups::table)
            .values(db::NewGroup { name })
            .get_result::<db::Group>(self)
            .map(StoredGroup::from)
            .map_err(From::from)
    }

    fn rename_group(&self, id: GroupId, name: &str) -> Result<(), StoreError> {
        let updated = diesel::update(groups::table.filter(groups::id.eq(id)))
            .set(groups::name.eq(name))
            .execute(self)?;

        if updated == 0 {
            Err(StoreError::NotFound(Record::Group(id)))
        } else {
            Ok(())
        }
    }

    fn delete_group(&self, id: GroupId) -> Result<(), StoreError> {
        self.transaction(|| {
            diesel::delete(access_rules::table.filter(access_rules::group.eq(id)))
                .execute(self)?;
            diesel::delete(workflow_groups::table.filter(workflow_groups::group.eq(id)))
                .execute(self)?;
            diesel::delete(group_members::table.filter(group_members::group.eq(id)))
                .execute(self)?;

            let deleted = diesel::delete(groups::table.filter(groups::id.eq(id)))
                .execute(self)?;

            if deleted == 0 {
                Err(StoreError::NotFound(Record::Group(id)))
            } else {
                Ok(())
            }
        })
    }

    fn add_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError> {
        self.group(group)?;

        diesel::insert_into(group_members::table)
            .values(db::GroupMember { group, user })
            .on_conflict_do_nothing()
            .execute(self)?;

        Ok(())
    }

    fn remove_member(&self, group: GroupId, user: UserId) -> Result<(), StoreError> {
        diesel::delete(group_members::table
            .filter(group_members::group.eq(group)
                .and(group_members::user.eq(user))))
            .execute(self)?;

        Ok(())
    }

    fn nodes(&self) -> Result<Vec<Node>, StoreError> {
        Ok(nodes::table
            .order_by(nodes::id.asc())
            .get_results::<db::Node>(self)?
            .into_iter()
            .map(Node::from)
            .collect())
    }

    fn children(&self, node: NodeId) -> Result<Vec<Node>, StoreError> {
        self.node(node)?;

        Ok(nodes::table
            .filter(nodes::parent.eq(node))
            .order_by(nodes::id.asc())
            .get_results::<db::Node>(self)?
            .into_iter()
            .map(Node::from)
            .collect())
    }

    fn create_node(&self, parent: Option<NodeId>, slug: &str, class: &str)
    -> Result<Node, StoreError> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        diesel::insert_into(nodes::table)
            .values(db::NewNode { parent, slug, class })
            .get_result::<db::Node>(self)
            .map(Node::from)
            .map_err(From::from)
    }

    fn set_parent(&self, node: NodeId, parent: Option<NodeId>) -> Result<(), StoreError> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        let updated = diesel::update(nodes::table.filter(nodes::id.eq(node)))
            .set(nodes::parent.eq(parent))
            .execute(self)?;

        if updated == 0 {
            Err(StoreError::NotFound(Record::Node(node)))
        } else {
            Ok(())
        }
    }

    fn delete_node(&self, node: NodeId) -> Result<(), StoreError> {
        self.transaction(|| {
            diesel::delete(node_tags::table.filter(node_tags::node.eq(node)))
                .execute(self)?;
            diesel::delete(versions::table.filter(versions::node.eq(node)))
                .execute(self)?;
            diesel::delete(access_rules::table.filter(access_rules::node.eq(node)))
                .execute(self)?;

            let deleted = diesel::delete(nodes::table.filter(nodes::id.eq(node)))
                .execute(self)?;

            if deleted == 0 {
                Err(StoreError::NotFound(Record::Node(node)))
            } else {
                Ok(())
            }
        })
    }

    fn set_access_rule(&self, node: NodeId, group: GroupId, permission: Permission)
    -> Result<(), StoreError> {
        self.node(node)?;

        diesel::insert_into(access_rules::table)
            .values(db::AccessRule { node, group, permission: permission.value() })
            .on_conflict((access_rules::node, access_rules::group))
            .do_update()
            .set(access_rules::permission.eq(permission.value()))
            .execute(self)?;

        Ok(())
    }

    fn remove_access_rule(&self, node: NodeId, group: GroupId) -> Result<(), StoreError> {
        diesel::delete(access_rules::table
            .filter(access_rules::node.eq(node)
                .and(access_rules::group.eq(group))))
            .execute(self)?;

        Ok(())
    }

    fn workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        workflows::table
            .order_by(workflows::id.asc())
            .get_results::<db::Workflow>(self)?
            .into_iter()
            .map(|data| load_workflow(self, data))
            .collect()
    }

    fn create_workflow(&self, name: &str, groups: &[GroupId])
    -> Result<Workflow, StoreError> {
        self.transaction(|| {
            check_groups(self, groups)?;

            let data = diesel::insert_into(workflows::table)
                .values(db::NewWorkflow { name })
                .get_result::<db::Workflow>(self)?;

            insert_workflow_groups(self, data.id, groups)?;

            load_workflow(self, data)
        })
    }

    fn set_workflow_groups(&self, id: WorkflowId, groups: &[GroupId])
    -> Result<(), StoreError> {
        self.transaction(|| {
            self.workflow(id)?;
            check_groups(self, groups)?;

            diesel::delete(workflow_groups::table
                .filter(workflow_groups::workflow.eq(id)))
                .execute(self)?;

            insert_workflow_groups(self, id, groups)
        })
    }

    fn assign_workflow(
        &self,
        node: NodeId,
        workflow: Option<WorkflowId>,
        children_only: bool,
    ) -> Result<(), StoreError> {
        if let Some(id) = workflow {
            self.workflow(id)?;
        }

        let target = nodes::table.filter(nodes::id.eq(node));

        let updated = if children_only {
            diesel::update(target)
                .set(nodes::children_workflow.eq(workflow))
                .execute(self)?
        } else {
            diesel::update(target)
                .set(nodes::workflow.eq(workflow))
                .execute(self)?
        };

        if updated == 0 {
            Err(StoreError::NotFound(Record::Node(node)))
        } else {
            Ok(())
        }
    }
}
