//! Commands for managing access rules.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{GroupId, NodeId},
    permissions::Permission,
    store::{Admin, Store},
};
use super::util::print_table;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List access rules set on a node
    #[structopt(name = "list")]
    List {
        node: NodeId,
    },
    /// Grant a group a permission on a node and its descendants
    #[structopt(name = "set")]
    Set {
        node: NodeId,
        /// Group, or 0 for everyone
        group: GroupId,
        /// One of none, read, create, remove, admin
        permission: Permission,
    },
    /// Remove the access rule for a group on a node
    #[structopt(name = "remove")]
    Remove {
        node: NodeId,
        group: GroupId,
    },
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    let db = db::connect(cfg)?;

    match opts.command {
        Command::List { node } => list(&db, node),
        Command::Set { node, group, permission } =>
            Ok(db.set_access_rule(node, group, permission)?),
        Command::Remove { node, group } =>
            Ok(db.remove_access_rule(node, group)?),
    }
}

fn list(db: &db::Connection, node: NodeId) -> Result<()> {
    let rules = db.access_rules(node)?;

    let rows = rules.iter()
        .map(|rule| (rule.group.to_string(), rule.permission.as_str()))
        .collect::<Vec<_>>();

    print_table(("Group", "Permission"), &rows);

    Ok(())
}
