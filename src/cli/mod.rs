use std::path::PathBuf;
use structopt::StructOpt;

use crate::Result;

mod check;
mod group;
mod node;
mod rule;
mod util;
mod version;
mod workflow;

#[derive(StructOpt)]
struct Opts {
    /// Configuration file
    #[structopt(long = "config", short = "c", default_value = "config.toml",
        parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Manage groups
    #[structopt(name = "group")]
    Group(group::Opts),
    /// Manage the content tree
    #[structopt(name = "node")]
    Node(node::Opts),
    /// Manage access rules
    #[structopt(name = "rule")]
    Rule(rule::Opts),
    /// Manage workflows
    #[structopt(name = "workflow")]
    Workflow(workflow::Opts),
    /// Manage versions of a node
    #[structopt(name = "version")]
    Version(version::Opts),
    /// Check a user's permission on a node
    #[structopt(name = "check")]
    Check(check::CheckOpts),
    /// Show a user's release state of a node
    #[structopt(name = "release-state")]
    ReleaseState(check::ReleaseStateOpts),
}

pub fn main() -> Result<()> {
    let opts = Opts::from_args();
    let config = crate::config::load(&opts.config)?;

    setup_logging(&config.logging)?;

    // Run validation after logging setup so that it can report problems.
    config.validate()?;

    match opts.command {
        Command::Group(opts) => group::main(&config, opts),
        Command::Node(opts) => node::main(&config, opts),
        Command::Rule(opts) => rule::main(&config, opts),
        Command::Workflow(opts) => workflow::main(&config, opts),
        Command::Version(opts) => version::main(&config, opts),
        Command::Check(opts) => check::check(&config, opts),
        Command::ReleaseState(opts) => check::release_state(&config, opts),
    }
}

fn setup_logging(config: &crate::config::Logging) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(config.level);

    for (module, level) in &config.filters {
        builder.filter_module(&module, *level);
    }

    builder.try_init()?;
    Ok(())
}
