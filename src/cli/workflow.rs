//! Commands for managing workflows.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    db,
    models::{GroupId, NodeId, WorkflowId, effective_workflow},
    store::Admin,
};
use super::util::{format_groups, print_table};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List workflows
    #[structopt(name = "list")]
    List,
    /// Add a workflow
    #[structopt(name = "add")]
    Add {
        /// Workflow's name
        name: String,
        /// Groups a version passes through, in order. Use 0 for everyone.
        groups: Vec<GroupId>,
    },
    /// Replace groups of a workflow
    #[structopt(name = "set-groups")]
    SetGroups {
        workflow: WorkflowId,
        groups: Vec<GroupId>,
    },
    /// Assign a workflow to a node
    #[structopt(name = "assign")]
    Assign(AssignOpts),
    /// Show the workflow governing a node
    #[structopt(name = "effective")]
    Effective {
        node: NodeId,
    },
}

#[derive(StructOpt)]
pub struct AssignOpts {
    node: NodeId,
    /// Workflow to assign. When omitted the assignment is removed.
    workflow: Option<WorkflowId>,
    /// Assign to the node's descendants rather than to the node itself
    #[structopt(long = "children")]
    children_only: bool,
}

pub fn main(cfg: &Config, opts: Opts) -> Result<()> {
    let db = db::connect(cfg)?;

    match opts.command {
        Command::List => list(&db),
        Command::Add { name, groups } => {
            let workflow = db.create_workflow(&name, &groups)?;
            println!("Created workflow {}", workflow.id());
            Ok(())
        }
        Command::SetGroups { workflow, groups } =>
            Ok(db.set_workflow_groups(workflow, &groups)?),
        Command::Assign(opts) =>
            Ok(db.assign_workflow(opts.node, opts.workflow, opts.children_only)?),
        Command::Effective { node } => {
            let workflow = effective_workflow(&db, node)?;
            println!("{} ({}): {}",
                workflow.name(), workflow.id(), format_groups(workflow.groups()));
            Ok(())
        }
    }
}

fn list(db: &db::Connection) -> Result<()> {
    let workflows = db.workflows()?;

    let rows = workflows.iter()
        .map(|workflow| (
            workflow.id().to_string(),
            workflow.name(),
            format_groups(workflow.groups()),
        ))
        .collect::<Vec<_>>();

    print_table(("ID", "Name", "Groups"), &rows);

    Ok(())
}
