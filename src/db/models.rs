use chrono::NaiveDateTime;

use super::schema::*;

#[derive(Clone, Debug, Identifiable, Queryable)]
pub struct Node {
    pub id: i32,
    /// Parent node, `None` for roots.
    pub parent: Option<i32>,
    pub slug: String,
    pub class: String,
    /// Number of the newest version, `0` if there are none.
    pub max_version: i32,
    /// Number of the newest version with workflow group `0`, `0` if there
    /// are none.
    pub max_released_version: i32,
    /// Workflow assigned to this node.
    pub workflow: Option<i32>,
    /// Workflow assigned to this node's descendants.
    pub children_workflow: Option<i32>,
    /// Date under which this node is indexed.
    pub indexed_at: Option<NaiveDateTime>,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "nodes"]
pub struct NewNode<'a> {
    pub parent: Option<i32>,
    pub slug: &'a str,
    pub class: &'a str,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
pub struct Group {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "groups"]
pub struct NewGroup<'a> {
    pub name: &'a str,
}

#[derive(Clone, Copy, Debug, Insertable, Queryable)]
#[table_name = "group_members"]
pub struct GroupMember {
    pub group: i32,
    /// ID of a user, as known to the identity service.
    pub user: i32,
}

#[derive(Clone, Copy, Debug, Insertable, Queryable)]
#[table_name = "access_rules"]
pub struct AccessRule {
    pub node: i32,
    /// Group to which this rule applies. `0` means everyone.
    pub group: i32,
    /// Stored permission level. See [`crate::permissions::Permission`].
    pub permission: i32,
}

#[derive(Clone, Debug, Identifiable, Queryable)]
pub struct Workflow {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "workflows"]
pub struct NewWorkflow<'a> {
    pub name: &'a str,
}

#[derive(Clone, Copy, Debug, Insertable, Queryable)]
#[table_name = "workflow_groups"]
pub struct WorkflowGroup {
    pub workflow: i32,
    /// Position of this group in the workflow. Positions are ordered but
    /// need not be contiguous.
    pub position: i32,
    pub group: i32,
}

#[derive(Clone, Debug, Queryable)]
pub struct Version {
    pub node: i32,
    pub version: i32,
    pub changed: NaiveDateTime,
    pub note: String,
    pub content: String,
    /// Group currently holding this version, `0` once it's released.
    pub workflow_group: i32,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "versions"]
pub struct NewVersion<'a> {
    pub node: i32,
    pub version: i32,
    pub changed: NaiveDateTime,
    pub note: &'a str,
    pub content: &'a str,
    pub workflow_group: i32,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "node_tags"]
pub struct NewNodeTag<'a> {
    pub node: i32,
    pub tag: &'a str,
}
