//! Commands for managing groups.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{Group, GroupId, UserId},
    store::Admin,
};
use super::util::print_table;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List groups
    #[structopt(name = "list")]
    List,
    /// Add a group
    #[structopt(name = "add")]
    Add {
        /// Group's name
        name: String,
    },
    /// Rename a group
    #[structopt(name = "rename")]
    Rename {
        group: GroupId,
        /// Group's new name
        name: String,
    },
    /// Delete a group, with its access rules and workflow positions
    #[structopt(name = "delete")]
    Delete {
        group: GroupId,
    },
    /// List members of a group
    #[structopt(name = "members")]
    Members {
        group: GroupId,
    },
    /// Add a user to a group
    #[structopt(name = "join")]
    Join {
        group: GroupId,
        user: UserId,
    },
    /// Remove a user from a group
    #[structopt(name = "leave")]
    Leave {
        group: GroupId,
        user: UserId,
    },
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    let db = db::connect(cfg)?;

    match opts.command {
        Command::List => list(&db),
        Command::Add { name } => {
            let group = db.create_group(&name)?;
            println!("Created group {}", group.id);
            Ok(())
        }
        Command::Rename { group, name } =>
            Ok(Group::resolve(&db, group)?.set_name(&db, &name)?),
        Command::Delete { group } =>
            Ok(Group::resolve(&db, group)?.delete(&db)?),
        Command::Members { group } => members(&db, group),
        Command::Join { group, user } =>
            Ok(Group::resolve(&db, group)?.join(&db, user)?),
        Command::Leave { group, user } =>
            Ok(Group::resolve(&db, group)?.leave(&db, user)?),
    }
}

fn list(db: &db::Connection) -> Result<()> {
    let groups = db.groups()?;

    let rows = groups.iter()
        .map(|group| (group.id.to_string(), group.name.as_str()))
        .collect::<Vec<_>>();

    print_table(("ID", "Name"), &rows);

    Ok(())
}

fn members(db: &db::Connection, group: GroupId) -> Result<()> {
    for user in Group::resolve(db, group)?.members(db)? {
        println!("{}", user);
    }

    Ok(())
}
