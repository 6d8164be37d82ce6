//! Tests for changing the shape of the content tree.

use failure::Fallible;
use folio::{
    store::{Admin, Store},
    tree::{self, TreeError},
};

mod common;

use self::common::*;

#[test]
fn path_starts_at_root() -> Fallible<()> {
    let f = Fixture::new()?;

    let path = tree::path(&f.store, f.page)?
        .into_iter()
        .map(|node| node.slug)
        .collect::<Vec<_>>();

    assert_eq!(path, vec!["library", "book", "chapter", "page"]);

    Ok(())
}

#[test]
fn cannot_move_node_under_itself() -> Fallible<()> {
    let f = Fixture::new()?;

    match tree::move_node(&f.store, f.book, Some(f.page)) {
        Err(TreeError::Cycle { node, parent }) => {
            assert_eq!(node, f.book);
            assert_eq!(parent, f.page);
        }
        other => panic!("expected cycle, got {:?}", other),
    }

    match tree::move_node(&f.store, f.book, Some(f.book)) {
        Err(TreeError::Cycle { .. }) => (),
        other => panic!("expected cycle, got {:?}", other),
    }

    assert_eq!(f.store.node(f.book)?.parent, Some(f.library));

    Ok(())
}

#[test]
fn moved_node_inherits_from_new_parent() -> Fallible<()> {
    let f = Fixture::new()?;

    let archive = tree::create_node(&f.store, None, "archive", "collection")?;
    tree::move_node(&f.store, f.chapter, Some(archive.id))?;

    assert_eq!(f.store.node(f.chapter)?.parent, Some(archive.id));
    assert!(folio::access::check_permission(
        &f.store, f.page, Some(AUTHOR), folio::permissions::Permission::Create)
        .unwrap_err()
        .is_unauthorized());

    tree::move_node(&f.store, f.chapter, None)?;
    assert!(f.store.node(f.chapter)?.is_root());

    Ok(())
}

#[test]
fn only_leaves_can_be_deleted() -> Fallible<()> {
    let f = Fixture::new()?;

    match tree::delete_node(&f.store, f.chapter) {
        Err(TreeError::HasChildren(node)) => assert_eq!(node, f.chapter),
        other => panic!("expected node with children, got {:?}", other),
    }

    tree::delete_node(&f.store, f.page)?;
    assert!(f.store.children(f.chapter)?.is_empty());
    assert!(f.store.node(f.page).is_err());

    Ok(())
}

#[test]
fn slugs_are_validated() -> Fallible<()> {
    let f = Fixture::new()?;

    for slug in &["", "a/b", " padded"] {
        match tree::create_node(&f.store, Some(f.book), slug, "page") {
            Err(TreeError::InvalidSlug(_)) => (),
            other => panic!("expected invalid slug for {:?}, got {:?}", slug, other),
        }
    }

    Ok(())
}
