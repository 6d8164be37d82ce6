use chrono::NaiveDateTime;
use serde::Serialize;

use super::{GroupId, NodeId};

/// Workflow group ID of a version which completed its workflow.
pub const RELEASED: GroupId = 0;

/// A single version of a node's content.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Version {
    pub node: NodeId,
    /// Version number, starting at 1.
    pub number: i32,
    pub changed: NaiveDateTime,
    pub note: String,
    pub content: String,
    /// Workflow group currently holding this version, or [`RELEASED`].
    pub workflow_group: GroupId,
}

/// Data needed to create a new version.
#[derive(Clone, Debug)]
pub struct NewVersion {
    pub note: String,
    pub content: String,
    pub workflow_group: GroupId,
}

impl Version {
    pub fn is_released(&self) -> bool {
        self.workflow_group == RELEASED
    }
}
