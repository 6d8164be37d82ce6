//! Commands for managing versions of a node.

use std::{fs, path::PathBuf};
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    editing,
    models::{GroupId, NewVersion, NodeId, UserId},
    store::Store,
};
use super::util::print_table;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List versions of a node
    #[structopt(name = "list")]
    List {
        node: NodeId,
    },
    /// Print content of a version
    #[structopt(name = "show")]
    Show {
        node: NodeId,
        version: i32,
    },
    /// Save a new version on behalf of a user
    #[structopt(name = "save")]
    Save(SaveOpts),
    /// Move a version forward in its workflow on behalf of a user
    #[structopt(name = "release")]
    Release(TransitionOpts),
    /// Move a version back in its workflow on behalf of a user
    #[structopt(name = "revoke")]
    Revoke(TransitionOpts),
    /// Move a version to any group, without checking permissions
    #[structopt(name = "set-group")]
    SetGroup {
        node: NodeId,
        version: i32,
        /// Group to hold the version, or 0 to release it
        group: GroupId,
    },
}

#[derive(StructOpt)]
pub struct SaveOpts {
    node: NodeId,
    /// File with the new content
    #[structopt(parse(from_os_str))]
    file: PathBuf,
    /// Acting user
    #[structopt(long = "user", short = "u")]
    user: UserId,
    /// Group to hold the new version. Defaults to the suggested group.
    #[structopt(long = "group", short = "g")]
    group: Option<GroupId>,
    /// Description of the change
    #[structopt(long = "note", short = "n", default_value = "")]
    note: String,
}

#[derive(StructOpt)]
pub struct TransitionOpts {
    node: NodeId,
    version: i32,
    /// Acting user
    #[structopt(long = "user", short = "u")]
    user: UserId,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    let db = db::connect(cfg)?;

    match opts.command {
        Command::List { node } => list(&db, node),
        Command::Show { node, version } => {
            print!("{}", db.version(node, version)?.content);
            Ok(())
        }
        Command::Save(opts) => save(&db, opts),
        Command::Release(opts) => {
            let group = editing::release_version(
                &db, opts.node, opts.version, Some(opts.user))?;
            println!("Version {} is now held by group {}", opts.version, group);
            Ok(())
        }
        Command::Revoke(opts) => {
            let group = editing::revoke_version(
                &db, opts.node, opts.version, Some(opts.user))?;
            println!("Version {} is now held by group {}", opts.version, group);
            Ok(())
        }
        Command::SetGroup { node, version, group } => {
            if !editing::set_workflow_group(&db, node, version, group)? {
                println!("Version {} is already held by group {}", version, group);
            }
            Ok(())
        }
    }
}

fn list(db: &db::Connection, node: NodeId) -> Result<()> {
    let versions = db.versions(node)?;

    let rows = versions.iter()
        .map(|version| (
            version.number.to_string(),
            version.changed.format("%Y-%m-%d %H:%M").to_string(),
            if version.is_released() {
                "released".to_string()
            } else {
                version.workflow_group.to_string()
            },
            version.note.as_str(),
        ))
        .collect::<Vec<_>>();

    print_table(("Version", "Changed", "Group", "Note"), &rows);

    Ok(())
}

fn save(db: &db::Connection, opts: SaveOpts) -> Result<()> {
    let content = fs::read_to_string(&opts.file)?;

    let workflow_group = match opts.group {
        Some(group) => group,
        None => crate::release::ReleaseState::for_node(db, opts.node, Some(opts.user))?
            .suggested_save_group()
            .map(|group| group.id())
            .ok_or_else(|| failure::err_msg("User can't save this node"))?,
    };

    let version = editing::save_version(db, opts.node, Some(opts.user), &NewVersion {
        note: opts.note,
        content,
        workflow_group,
    })?;

    println!("Saved version {}", version.number);

    Ok(())
}
