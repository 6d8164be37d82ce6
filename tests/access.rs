//! Tests for resolving access to nodes.

use failure::Fallible;
use folio::{
    access::{CheckPermissionError, check_permission, check_permission_with_rules},
    error::ApiError,
    models::{FindWorkflowError, group::EVERYONE},
    permissions::Permission,
    release::ReleaseStateError,
    store::{Admin, StoreError},
};
use http::StatusCode;

mod common;

use self::common::*;

#[test]
fn rules_apply_to_descendants() -> Fallible<()> {
    let f = Fixture::new()?;

    check_permission(&f.store, f.page, Some(EDITOR), Permission::Admin)?;
    check_permission(&f.store, f.page, Some(AUTHOR), Permission::Create)?;
    check_permission(&f.store, f.book, Some(AUTHOR), Permission::Create)?;

    Ok(())
}

#[test]
fn rules_do_not_apply_to_ancestors() -> Fallible<()> {
    let f = Fixture::new()?;

    let err = check_permission(&f.store, f.library, Some(AUTHOR), Permission::Create)
        .unwrap_err();
    assert!(err.is_unauthorized());

    Ok(())
}

#[test]
fn insufficient_rule_does_not_grant() -> Fallible<()> {
    let f = Fixture::new()?;

    let err = check_permission(&f.store, f.page, Some(AUTHOR), Permission::Remove)
        .unwrap_err();
    assert!(err.is_unauthorized());

    Ok(())
}

#[test]
fn editors_can_read_without_rules() -> Fallible<()> {
    let f = Fixture::new()?;

    check_permission(&f.store, f.page, Some(REVIEWER), Permission::Read)?;

    let rules = check_permission_with_rules(
        &f.store, f.page, Some(REVIEWER), Permission::Read)?;
    assert!(rules.is_empty());

    let err = check_permission(&f.store, f.page, Some(REVIEWER), Permission::Create)
        .unwrap_err();
    assert!(err.is_unauthorized());

    Ok(())
}

#[test]
fn outsiders_are_denied() -> Fallible<()> {
    let f = Fixture::new()?;

    let err = check_permission(&f.store, f.page, Some(OUTSIDER), Permission::Read)
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.code().as_ref().map(|c| c.as_ref()), Some("node:access-denied"));

    Ok(())
}

#[test]
fn everyone_rule_grants_anonymous_read_only() -> Fallible<()> {
    let f = Fixture::new()?;

    assert!(check_permission(&f.store, f.page, None, Permission::Read)
        .unwrap_err()
        .is_unauthorized());

    f.store.set_access_rule(f.book, EVERYONE, Permission::Admin)?;

    check_permission(&f.store, f.page, None, Permission::Read)?;
    check_permission(&f.store, f.page, Some(OUTSIDER), Permission::Admin)?;

    assert!(check_permission(&f.store, f.page, None, Permission::Create)
        .unwrap_err()
        .is_unauthorized());

    Ok(())
}

#[test]
fn no_permission_is_always_granted() -> Fallible<()> {
    let f = Fixture::new()?;

    check_permission(&f.store, f.library, None, Permission::None)?;
    check_permission(&f.store, f.library, Some(OUTSIDER), Permission::None)?;

    Ok(())
}

#[test]
fn permitting_rules_are_collected_from_all_ancestors() -> Fallible<()> {
    let f = Fixture::new()?;

    f.store.set_access_rule(f.library, f.authors, Permission::Read)?;

    let rules = check_permission_with_rules(
        &f.store, f.page, Some(AUTHOR), Permission::Read)?;

    assert!(rules.contains(f.book, f.authors));
    assert!(rules.contains(f.library, f.authors));
    assert!(rules.survives_removal_of(f.book, f.authors));

    let rules = check_permission_with_rules(
        &f.store, f.page, Some(AUTHOR), Permission::Create)?;

    assert!(rules.contains(f.book, f.authors));
    assert!(!rules.contains(f.library, f.authors));
    assert!(!rules.survives_removal_of(f.book, f.authors));

    Ok(())
}

#[test]
fn invalid_stored_permission_is_an_error() -> Fallible<()> {
    let f = Fixture::new()?;

    f.store.set_raw_access_rule(f.chapter, f.authors, 7);

    match check_permission(&f.store, f.page, Some(AUTHOR), Permission::Read) {
        Err(CheckPermissionError::Store(StoreError::InvalidPermission(value))) => {
            assert_eq!(value.0, 7);
        }
        other => panic!("expected invalid permission error, got {:?}", other),
    }

    Ok(())
}

#[test]
fn cyclic_tree_is_detected() -> Fallible<()> {
    let f = Fixture::new()?;

    // Bypass validation done by folio::tree::move_node.
    f.store.set_parent(f.book, Some(f.page))?;

    match check_permission(&f.store, f.page, Some(OUTSIDER), Permission::Read) {
        Err(CheckPermissionError::Store(StoreError::Cycle(_))) => (),
        other => panic!("expected cycle error, got {:?}", other),
    }

    Ok(())
}

#[test]
fn missing_workflow_is_an_error() -> Fallible<()> {
    let f = Fixture::new()?;

    let orphan = f.store.create_node(None, "orphan", "page")?;

    match check_permission(&f.store, orphan.id, Some(OUTSIDER), Permission::Read) {
        Err(CheckPermissionError::ReleaseState(
            ReleaseStateError::Workflow(FindWorkflowError::NoWorkflow(id)))) => {
            assert_eq!(id, orphan.id);
        }
        other => panic!("expected missing workflow error, got {:?}", other),
    }

    Ok(())
}
