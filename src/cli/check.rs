//! Commands for inspecting what a user may do with a node.

use structopt::StructOpt;

use crate::{
    Config,
    Result,
    access,
    db,
    models::{NodeId, UserId},
    permissions::Permission,
    release::ReleaseState,
};
use super::util::{format_groups, print_json};

#[derive(StructOpt)]
pub struct CheckOpts {
    node: NodeId,
    /// Required permission
    #[structopt(default_value = "read")]
    permission: Permission,
    /// User to check. When omitted an anonymous user is assumed.
    #[structopt(long = "user", short = "u")]
    user: Option<UserId>,
    /// List access rules granting the permission
    #[structopt(long = "rules")]
    rules: bool,
}

pub fn check(cfg: &Config, opts: CheckOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    if !opts.rules {
        return match access::check_permission(&db, opts.node, opts.user, opts.permission) {
            Ok(()) => {
                println!("granted");
                Ok(())
            }
            Err(ref err) if err.is_unauthorized() => {
                println!("denied");
                Ok(())
            }
            Err(err) => Err(err.into()),
        };
    }

    match access::check_permission_with_rules(&db, opts.node, opts.user, opts.permission) {
        Ok(rules) => {
            println!("granted");

            if rules.is_empty() {
                println!("  by editor access");
            }

            for (node, groups) in rules.iter() {
                for group in groups {
                    println!("  by group {} on node {}", group, node);
                }
            }

            Ok(())
        }
        Err(ref err) if err.is_unauthorized() => {
            println!("denied");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(StructOpt)]
pub struct ReleaseStateOpts {
    node: NodeId,
    /// Version to inspect. Defaults to the newest version.
    #[structopt(long = "version")]
    version: Option<i32>,
    /// User whose state to compute. When omitted an anonymous user is assumed.
    #[structopt(long = "user", short = "u")]
    user: Option<UserId>,
    /// Print state as JSON
    #[structopt(long = "json")]
    json: bool,
}

pub fn release_state(cfg: &Config, opts: ReleaseStateOpts) -> Result<()> {
    let db = db::connect(cfg)?;

    let state = match opts.version {
        Some(version) => ReleaseState::for_version(&db, opts.node, version, opts.user)?,
        None => ReleaseState::for_node(&db, opts.node, opts.user)?,
    };

    if opts.json {
        return print_json(&state.get_public());
    }

    let name = |group: Option<&crate::models::Group>| group
        .map_or_else(|| "-".to_string(), |g| format!("{} ({})", g.name(), g.id()));

    println!("Workflow:  {}", format_groups(state.groups()));
    println!("Held by:   {}", name(Some(state.current())));
    println!("Can edit:  {}", state.can_edit());
    println!("Revoke to: {}", name(state.revoke_to_group()));
    println!("Release to: {}", name(state.release_to_group()));
    println!("Save to:   {}", format_groups(
        &state.save_groups().into_iter().cloned().collect::<Vec<_>>()));
    println!("Suggested: {}", name(state.suggested_save_group()));

    Ok(())
}
