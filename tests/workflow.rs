//! Tests for finding workflows and computing release states.

use chrono::NaiveDate;
use failure::Fallible;
use folio::{
    access::check_permission,
    models::{FindWorkflowError, Group, NewVersion, effective_workflow, group::EVERYONE},
    permissions::Permission,
    release::ReleaseState,
    store::{Admin, Record, Store, StoreError},
};

mod common;

use self::common::*;

/// Insert a version held by `group` directly, without any checks.
fn insert(f: &Fixture, group: i32) -> Fallible<i32> {
    let changed = NaiveDate::from_ymd(2019, 10, 1).and_hms(12, 0, 0);
    let (version, _) = f.store.insert_version(f.page, &NewVersion {
        note: String::new(),
        content: "Content".to_string(),
        workflow_group: group,
    }, changed)?;
    Ok(version.number)
}

#[test]
fn workflow_is_inherited() -> Fallible<()> {
    let f = Fixture::new()?;

    assert_eq!(effective_workflow(&f.store, f.page)?, f.workflow);
    assert_eq!(effective_workflow(&f.store, f.library)?, f.workflow);

    Ok(())
}

#[test]
fn children_workflow_skips_the_node_itself() -> Fallible<()> {
    let f = Fixture::new()?;

    let quick = f.store.create_workflow("Quick", &[f.editors])?;
    f.store.assign_workflow(f.book, Some(quick.id()), true)?;

    assert_eq!(effective_workflow(&f.store, f.book)?, f.workflow);
    assert_eq!(effective_workflow(&f.store, f.chapter)?, quick);
    assert_eq!(effective_workflow(&f.store, f.page)?, quick);

    Ok(())
}

#[test]
fn own_workflow_wins_over_inherited() -> Fallible<()> {
    let f = Fixture::new()?;

    let quick = f.store.create_workflow("Quick", &[f.editors])?;
    let solo = f.store.create_workflow("Solo", &[f.authors])?;
    f.store.assign_workflow(f.book, Some(quick.id()), true)?;
    f.store.assign_workflow(f.page, Some(solo.id()), false)?;

    assert_eq!(effective_workflow(&f.store, f.page)?, solo);

    Ok(())
}

#[test]
fn node_without_workflow() -> Fallible<()> {
    let f = Fixture::new()?;

    let orphan = f.store.create_node(None, "orphan", "page")?;

    match effective_workflow(&f.store, orphan.id) {
        Err(FindWorkflowError::NoWorkflow(id)) => assert_eq!(id, orphan.id),
        other => panic!("expected missing workflow, got {:?}", other),
    }

    Ok(())
}

#[test]
fn workflow_sees_renamed_groups_when_reloaded() -> Fallible<()> {
    let f = Fixture::new()?;

    f.store.rename_group(f.reviewers, "Proofreaders")?;

    let workflow = effective_workflow(&f.store, f.page)?;
    assert_eq!(workflow.groups()[1].name(), "Proofreaders");
    assert_eq!(f.workflow.groups()[1].name(), "Reviewers");

    Ok(())
}

#[test]
fn release_state_of_version_in_review() -> Fallible<()> {
    let f = Fixture::new()?;
    let version = insert(&f, f.reviewers)?;

    let state = ReleaseState::for_version(&f.store, f.page, version, Some(AUTHOR))?;

    assert_eq!(state.index(), 1);
    assert!(state.can_edit());
    assert_eq!(state.revoke_to_group().map(Group::id), Some(f.authors));
    assert_eq!(state.release_to_group(), None);
    assert_eq!(state.save_groups().into_iter().map(Group::id).collect::<Vec<_>>(),
        vec![f.authors, f.reviewers]);
    assert_eq!(state.suggested_save_group().map(Group::id), Some(f.reviewers));

    let state = ReleaseState::for_version(&f.store, f.page, version, Some(REVIEWER))?;

    assert_eq!(state.revoke_to_group(), None);
    assert_eq!(state.release_to_group().map(Group::id), Some(f.editors));

    Ok(())
}

#[test]
fn outsiders_cannot_edit() -> Fallible<()> {
    let f = Fixture::new()?;
    let version = insert(&f, f.authors)?;

    for user in &[None, Some(OUTSIDER)] {
        let state = ReleaseState::for_version(&f.store, f.page, version, *user)?;

        assert!(!state.can_edit());
        assert!(state.save_groups().is_empty());
        assert_eq!(state.suggested_save_group(), None);
        assert_eq!(state.revoke_to_group(), None);
        assert_eq!(state.release_to_group(), None);
    }

    Ok(())
}

#[test]
fn node_without_versions_is_released() -> Fallible<()> {
    let f = Fixture::new()?;

    let state = ReleaseState::for_node(&f.store, f.page, Some(EDITOR))?;

    assert!(state.is_released());
    assert!(state.current().is_read_only());
    assert_eq!(state.revoke_to_group().map(Group::id), Some(f.editors));

    Ok(())
}

#[test]
fn group_removed_from_workflow_falls_back_to_first() -> Fallible<()> {
    let f = Fixture::new()?;
    let version = insert(&f, f.reviewers)?;

    f.store.set_workflow_groups(f.workflow.id(), &[f.authors, f.editors])?;

    let state = ReleaseState::for_version(&f.store, f.page, version, Some(AUTHOR))?;

    assert_eq!(state.index(), 0);
    assert_eq!(state.current().id(), f.authors);
    assert_eq!(state.revoke_to_group(), None);
    assert_eq!(state.release_to_group().map(Group::id), Some(f.editors));

    Ok(())
}

#[test]
fn empty_workflow_is_never_editable() -> Fallible<()> {
    let f = Fixture::new()?;

    let empty = f.store.create_workflow("Empty", &[])?;
    f.store.assign_workflow(f.page, Some(empty.id()), false)?;

    let state = ReleaseState::for_node(&f.store, f.page, Some(EDITOR))?;

    assert_eq!(state.groups().len(), 1);
    assert_eq!(state.index(), 0);
    assert!(!state.can_edit());

    Ok(())
}

#[test]
fn workflow_with_unknown_group_is_not_created() -> Fallible<()> {
    let f = Fixture::new()?;

    match f.store.create_workflow("Broken", &[f.authors, 9999]) {
        Err(StoreError::NotFound(Record::Group(9999))) => (),
        other => panic!("expected missing group, got {:?}", other),
    }

    let workflows = f.store.workflows()?;
    assert_eq!(workflows, vec![f.workflow.clone()]);

    let open = f.store.create_workflow("Open", &[EVERYONE, f.editors])?;
    assert!(open.groups()[0].is_everyone());
    assert_eq!(open.groups()[1].id(), f.editors);

    Ok(())
}

#[test]
fn unknown_group_does_not_replace_workflow_groups() -> Fallible<()> {
    let f = Fixture::new()?;

    match f.store.set_workflow_groups(f.workflow.id(), &[f.editors, 9999]) {
        Err(StoreError::NotFound(Record::Group(9999))) => (),
        other => panic!("expected missing group, got {:?}", other),
    }

    assert_eq!(effective_workflow(&f.store, f.page)?, f.workflow);

    let err = check_permission(&f.store, f.page, Some(OUTSIDER), Permission::Read)
        .unwrap_err();
    assert!(err.is_unauthorized());

    Ok(())
}
