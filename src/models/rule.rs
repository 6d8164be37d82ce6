use serde::Serialize;

use crate::permissions::Permission;
use super::{GroupId, NodeId};

/// A single stored access rule: members of `group` hold `permission` on
/// `node` and, unless overruled, on all its descendants.
///
/// Rules themselves are flat. Inheritance is applied by
/// [`check_permission`][crate::access::check_permission].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct AccessRule {
    pub node: NodeId,
    pub group: GroupId,
    pub permission: Permission,
}
