use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

use crate::store::{Store, StoreError};

/// Identifier of a node.
pub type NodeId = i32;

/// A single node of the content tree.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// Parent of this node, `None` for a root.
    pub parent: Option<NodeId>,
    pub slug: String,
    /// Code naming the kind of content this node holds.
    pub class: String,
    /// Number of the newest version, `0` if there are no versions.
    pub max_version: i32,
    /// Number of the newest released version, `0` if none was released.
    pub max_released_version: i32,
}

/// Data derived from a node's newest released version, used for indexing.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct NodeIndex {
    /// Tags, sorted and without duplicates.
    pub tags: Vec<String>,
    /// Date under which the node is indexed.
    pub timestamp: Option<NaiveDateTime>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Was any version of this node released?
    pub fn is_public(&self) -> bool {
        self.max_released_version > 0
    }

    /// Iterate over this node and its ancestors, up to the root.
    pub fn ancestors<S>(self, store: &S) -> Ancestors<S>
    where
        S: Store + ?Sized,
    {
        Ancestors {
            store,
            next: Some(Ok(self)),
            seen: HashSet::new(),
        }
    }
}

/// Iterator over a node and all its ancestors, nearest first.
///
/// See [`Node::ancestors()`].
pub struct Ancestors<'s, S: ?Sized> {
    store: &'s S,
    next: Option<Result<Node, StoreError>>,
    seen: HashSet<NodeId>,
}

impl<'s, S: ?Sized> Ancestors<'s, S> {
    /// Start iteration at a node given by ID.
    pub fn from_id(store: &'s S, id: NodeId) -> Self
    where
        S: Store,
    {
        Ancestors {
            store,
            next: Some(store.node(id)),
            seen: HashSet::new(),
        }
    }
}

impl<'s, S> Iterator for Ancestors<'s, S>
where
    S: Store + ?Sized,
{
    type Item = Result<Node, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = match self.next.take()? {
            Ok(node) => node,
            Err(err) => return Some(Err(err)),
        };

        // A parent chain must never loop back on itself.
        if !self.seen.insert(node.id) {
            return Some(Err(StoreError::Cycle(node.id)));
        }

        self.next = node.parent.map(|parent| self.store.node(parent));

        Some(Ok(node))
    }
}
