//! Validated changes to the shape of the content tree.

use failure::Fail;
use log::info;

use crate::{
    ApiError,
    models::{Node, NodeId, node::Ancestors},
    store::{Admin, Store, StoreError},
};

/// Create a new node.
pub fn create_node<S>(store: &S, parent: Option<NodeId>, slug: &str, class: &str)
-> Result<Node, TreeError>
where
    S: Admin + ?Sized,
{
    validate_slug(slug)?;

    let node = store.create_node(parent, slug, class)?;
    info!("Created node {} ({}) under {:?}", node.id, node.slug, node.parent);

    Ok(node)
}

/// Move a node, with all its descendants, under a new parent.
///
/// A node can't be moved under itself or any of its descendants.
pub fn move_node<S>(store: &S, node: NodeId, parent: Option<NodeId>)
-> Result<(), TreeError>
where
    S: Admin + ?Sized,
{
    if let Some(parent) = parent {
        for ancestor in Ancestors::from_id(store, parent) {
            if ancestor?.id == node {
                return Err(TreeError::Cycle { node, parent });
            }
        }
    }

    store.set_parent(node, parent)?;
    info!("Moved node {} under {:?}", node, parent);

    Ok(())
}

/// Delete a node. Only nodes without children can be deleted.
pub fn delete_node<S>(store: &S, node: NodeId) -> Result<(), TreeError>
where
    S: Admin + ?Sized,
{
    if !store.children(node)?.is_empty() {
        return Err(TreeError::HasChildren(node));
    }

    store.delete_node(node)?;
    info!("Deleted node {}", node);

    Ok(())
}

/// Get a node's path from the root, as a list of nodes.
pub fn path<S>(store: &S, node: NodeId) -> Result<Vec<Node>, StoreError>
where
    S: Store + ?Sized,
{
    let mut path = Ancestors::from_id(store, node).collect::<Result<Vec<_>, _>>()?;
    path.reverse();
    Ok(path)
}

fn validate_slug(slug: &str) -> Result<(), TreeError> {
    if slug.is_empty() || slug.contains('/') || slug.trim() != slug {
        Err(TreeError::InvalidSlug(slug.to_string()))
    } else {
        Ok(())
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum TreeError {
    /// New parent is the node itself or one of its descendants.
    #[fail(display = "Cannot move node {} under its descendant {}", node, parent)]
    #[api(code = "node:move:cycle", status = "BAD_REQUEST")]
    Cycle {
        node: NodeId,
        parent: NodeId,
    },
    #[fail(display = "Node {} still has children", _0)]
    #[api(code = "node:delete:has-children", status = "BAD_REQUEST")]
    HasChildren(NodeId),
    #[fail(display = "Invalid slug {:?}", _0)]
    #[api(code = "node:slug:invalid", status = "BAD_REQUEST")]
    InvalidSlug(String),
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for TreeError ;
    StoreError => |e| TreeError::Store(e),
}
