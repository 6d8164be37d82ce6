//! Commands for managing the content tree.

use itertools::Itertools;
use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::NodeId,
    store::{Admin, Store},
    tree,
};
use super::util::print_table;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List nodes, or children of a node
    #[structopt(name = "list")]
    List {
        /// List only children of this node
        #[structopt(long = "parent")]
        parent: Option<NodeId>,
    },
    /// Add a node
    #[structopt(name = "add")]
    Add(AddOpts),
    /// Move a node under a new parent
    #[structopt(name = "move")]
    Move {
        node: NodeId,
        /// New parent. When omitted the node becomes a root.
        parent: Option<NodeId>,
    },
    /// Delete a node without children
    #[structopt(name = "delete")]
    Delete {
        node: NodeId,
    },
    /// Show a node's path and index data
    #[structopt(name = "show")]
    Show {
        node: NodeId,
    },
}

#[derive(StructOpt)]
pub struct AddOpts {
    /// Node's slug
    slug: String,
    /// Parent node
    #[structopt(long = "parent")]
    parent: Option<NodeId>,
    /// Kind of content this node holds
    #[structopt(long = "class", default_value = "page")]
    class: String,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    let db = db::connect(cfg)?;

    match opts.command {
        Command::List { parent } => list(&db, parent),
        Command::Add(opts) => {
            let node = tree::create_node(&db, opts.parent, &opts.slug, &opts.class)?;
            println!("Created node {}", node.id);
            Ok(())
        }
        Command::Move { node, parent } => Ok(tree::move_node(&db, node, parent)?),
        Command::Delete { node } => Ok(tree::delete_node(&db, node)?),
        Command::Show { node } => show(&db, node),
    }
}

fn list(db: &db::Connection, parent: Option<NodeId>) -> Result<()> {
    let nodes = match parent {
        Some(parent) => db.children(parent)?,
        None => db.nodes()?,
    };

    let rows = nodes.iter()
        .map(|node| (
            node.id.to_string(),
            node.parent.map_or_else(String::new, |p| p.to_string()),
            node.slug.as_str(),
            node.class.as_str(),
            format!("{}/{}", node.max_released_version, node.max_version),
        ))
        .collect::<Vec<_>>();

    print_table(("ID", "Parent", "Slug", "Class", "Released"), &rows);

    Ok(())
}

fn show(db: &db::Connection, node: NodeId) -> Result<()> {
    let path = tree::path(db, node)?;
    let index = db.node_index(node)?;

    println!("Path: /{}", path.iter().map(|node| node.slug.as_str()).join("/"));
    println!("Tags: {}", index.tags.iter().join(", "));

    if let Some(timestamp) = index.timestamp {
        println!("Date: {}", timestamp);
    }

    Ok(())
}
