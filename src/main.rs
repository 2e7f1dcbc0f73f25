//! authz-admin - administer scorecard roles and permissions
//!
//! Thin command line glue over the authorization library

#![allow(missing_docs)]

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use scorecard_authz::{Config, PermissionId, RbacSystem, Role, RoleId, UserId};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "authz-admin",
    version,
    about = "Administer scorecard roles, permissions and assignments"
)]
struct Cli {
    /// path to a YAML config file; environment variables are used otherwise
    #[arg(long, short, env = "AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    /// emit logs as JSON lines
    #[arg(long, env = "AUTHZ_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    cmd: Cmds,
}

#[derive(Subcommand)]
enum Cmds {
    /// apply database migrations and seed the catalog and built-in roles
    Migrate,
    /// manage roles
    #[command(subcommand)]
    Roles(RoleCmds),
    /// grant a permission to a role
    Grant(GrantArgs),
    /// revoke a permission from a role
    Revoke(GrantArgs),
    /// give a user a role
    Assign(AssignArgs),
    /// take a role from a user
    Unassign(AssignArgs),
    /// list users and their roles
    Users,
    /// explain whether a user may perform an action
    Check(CheckArgs),
    /// grant admin to the bootstrap user if nobody holds it
    EnsureAdmin,
}

#[derive(Subcommand)]
enum RoleCmds {
    /// list roles with their permissions
    List,
    /// create a role
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// rename a role or change its description
    Update {
        name: String,
        /// new name; the role keeps its name otherwise
        #[arg(long)]
        rename: Option<String>,
        /// new description; omit to clear it
        #[arg(long)]
        description: Option<String>,
    },
    /// delete a role
    Delete { name: String },
}

#[derive(Args)]
struct GrantArgs {
    /// role name
    role: String,
    /// resource table name, e.g. `sessions`
    resource: String,
    /// action, e.g. `update`
    action: String,
}

#[derive(Args)]
struct AssignArgs {
    user: UserId,
    role: String,
}

#[derive(Args)]
struct CheckArgs {
    user: UserId,
    resource: String,
    action: String,
    /// check one resource instance, taking ownership into account
    #[arg(long)]
    id: Option<i64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };

    if matches!(cli.cmd, Cmds::Migrate) && !config.storage().database.enabled {
        bail!("database storage is disabled, nothing to migrate");
    }

    let rbac = RbacSystem::from_config(&config)
        .await
        .context("failed to initialize authorization")?;

    match cli.cmd {
        Cmds::Migrate => {
            info!("Migrations applied");
            println!("ok");
        }
        Cmds::Roles(cmd) => run_roles(&rbac, cmd).await?,
        Cmds::Grant(args) => {
            let (role_id, permission_id) = resolve_grant(&rbac, &args).await?;
            rbac.assign_permission(role_id, permission_id).await?;
        }
        Cmds::Revoke(args) => {
            let (role_id, permission_id) = resolve_grant(&rbac, &args).await?;
            rbac.remove_permission(role_id, permission_id).await?;
        }
        Cmds::Assign(args) => rbac.assign_role_to_user(args.user, &args.role).await?,
        Cmds::Unassign(args) => rbac.remove_role_from_user(args.user, &args.role).await?,
        Cmds::Users => print_json(&rbac.list_users_with_roles().await?)?,
        Cmds::Check(args) => {
            let permission = rbac.catalog().parse(&args.resource, &args.action)?;
            let check = match args.id {
                Some(id) => {
                    rbac.check_resource_access_detailed(
                        args.user,
                        permission.resource,
                        id,
                        permission.action,
                    )
                    .await
                }
                None => {
                    rbac.check_permission_detailed(args.user, permission.resource, permission.action)
                        .await
                }
            };
            print_json(&check)?;
        }
        // Startup already ran the bootstrap; report what it did
        Cmds::EnsureAdmin => match rbac.startup_admin() {
            Some(user) => println!("granted admin to {}", user),
            None => println!("admin already present or no candidate"),
        },
    }

    Ok(())
}

async fn run_roles(rbac: &RbacSystem, cmd: RoleCmds) -> anyhow::Result<()> {
    match cmd {
        RoleCmds::List => print_json(&rbac.list_roles_with_permissions().await?)?,
        RoleCmds::Create { name, description } => {
            let id = rbac.create_role(&name, description).await?;
            println!("{}", id);
        }
        RoleCmds::Update {
            name,
            rename,
            description,
        } => {
            let role = find_role(rbac, &name).await?;
            let new_name = rename.unwrap_or(role.name);
            rbac.update_role(role.id, &new_name, description).await?;
        }
        RoleCmds::Delete { name } => {
            let role = find_role(rbac, &name).await?;
            rbac.delete_role(role.id).await?;
        }
    }
    Ok(())
}

async fn resolve_grant(
    rbac: &RbacSystem,
    args: &GrantArgs,
) -> anyhow::Result<(RoleId, PermissionId)> {
    let role = find_role(rbac, &args.role).await?;
    let permission = rbac.catalog().parse(&args.resource, &args.action)?;
    Ok((role.id, permission.id))
}

async fn find_role(rbac: &RbacSystem, name: &str) -> anyhow::Result<Role> {
    rbac.get_role_by_name(name)
        .await?
        .with_context(|| format!("no role named '{}'", name))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
