//! Shared fixture for integration tests.
//!
//! The fixture builds a small library in memory:
//!
//! ```text
//! library            workflow "Review": authors → reviewers → editors
//! └── book           authors: create
//!     └── chapter
//!         └── page
//! ```
//!
//! Editors have admin access to the whole library. Reviewers have no access
//! rules at all and can only read through being part of the workflow.
//!
//! The same library can be built in PostgreSQL, see [`db::fixture()`].

#![allow(dead_code)]

use failure::Fallible;
use folio::{
    models::{GroupId, NodeId, UserId, Workflow},
    permissions::Permission,
    store::{Admin, memory::MemoryStore},
};

pub mod db;

pub const AUTHOR: UserId = 1;
pub const REVIEWER: UserId = 2;
pub const EDITOR: UserId = 3;
pub const OUTSIDER: UserId = 4;

pub struct Fixture<S = MemoryStore> {
    pub store: S,
    pub authors: GroupId,
    pub reviewers: GroupId,
    pub editors: GroupId,
    pub library: NodeId,
    pub book: NodeId,
    pub chapter: NodeId,
    pub page: NodeId,
    pub workflow: Workflow,
}

impl Fixture {
    pub fn new() -> Fallible<Fixture> {
        Self::with_store(MemoryStore::new())
    }
}

impl<S: Admin> Fixture<S> {
    /// Build the library in an empty store.
    pub fn with_store(store: S) -> Fallible<Fixture<S>> {
        let authors = store.create_group("Authors")?.id;
        let reviewers = store.create_group("Reviewers")?.id;
        let editors = store.create_group("Editors")?.id;

        store.add_member(authors, AUTHOR)?;
        store.add_member(reviewers, REVIEWER)?;
        store.add_member(editors, EDITOR)?;

        let library = store.create_node(None, "library", "collection")?.id;
        let book = store.create_node(Some(library), "book", "book")?.id;
        let chapter = store.create_node(Some(book), "chapter", "chapter")?.id;
        let page = store.create_node(Some(chapter), "page", "page")?.id;

        store.set_access_rule(library, editors, Permission::Admin)?;
        store.set_access_rule(book, authors, Permission::Create)?;

        let workflow = store.create_workflow("Review", &[authors, reviewers, editors])?;
        store.assign_workflow(library, Some(workflow.id()), false)?;

        Ok(Fixture {
            store,
            authors,
            reviewers,
            editors,
            library,
            book,
            chapter,
            page,
            workflow,
        })
    }
}
