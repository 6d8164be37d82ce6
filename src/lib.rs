//! Hierarchical content tree with inheritable access rules and a staged
//! release workflow.
//!
//! Every node of the tree is guarded by [access rules][models::AccessRule]
//! which apply to the node they are set on and to all of its descendants.
//! Content of a node is kept as a sequence of [versions][models::Version],
//! each of which is held by one group of a [workflow][models::Workflow] until
//! it has passed through all of them and becomes public.
//!
//! The interesting parts are [`access`], deciding whether a user may perform
//! an operation on a node, and [`release`], deciding where a version sits in
//! its workflow and where a user may move it. Both work against the narrow
//! [`store`] interface, implemented for PostgreSQL in [`db`] and in memory
//! in [`store::memory`].

#[macro_use] extern crate diesel;

#[cfg(not(debug_assertions))]
#[macro_use]
extern crate diesel_migrations;

pub use folio_macros::ApiError;
pub use self::cli::main;

pub(crate) use self::config::Config;

#[macro_use] mod macros;

pub mod access;
pub mod cli;
pub mod config;
pub mod db;
pub mod editing;
pub mod error;
pub mod models;
pub mod permissions;
pub mod processing;
pub mod release;
pub mod store;
pub mod tree;

pub type Result<T, E=failure::Error> = std::result::Result<T, E>;
