//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;
use serde::Serialize;
use tracing::warn;

pub mod generate;
pub mod plugins;
pub mod publish;
pub mod status;
pub mod sync;
pub mod unlink;
pub mod validate;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok, robot_partial};
use crate::core::discovery::{find_orgs, find_skills};
use crate::core::org::{Organization, Skill};
use crate::error::{ChaparralError, Result};

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Sync(args) => sync::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::Unlink(args) => unlink::run(ctx, args),
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Generate(args) => generate::run(ctx, args),
        Commands::Publish(args) => publish::run(ctx, args),
        Commands::Plugins(args) => plugins::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link the shared CLAUDE.md and every skill into sibling repos
    Sync(sync::SyncArgs),

    /// Show the state of every managed link
    Status(status::StatusArgs),

    /// Remove managed symlinks
    Unlink(unlink::UnlinkArgs),

    /// Check skills for missing or malformed metadata
    Validate(validate::ValidateArgs),

    /// Print generated plugin descriptors without writing them
    Generate(generate::GenerateArgs),

    /// Write descriptors and publish the marketplace
    Publish(publish::PublishArgs),

    /// Installed and available plugins for a repository
    Plugins(plugins::PluginsArgs),
}

/// Organizations under the base path, optionally narrowed to one by name.
pub(crate) fn discover(ctx: &AppContext, only: Option<&str>) -> Result<Vec<Organization>> {
    if !ctx.base_path.is_dir() {
        return Err(ChaparralError::NotFound(format!(
            "base directory {} does not exist",
            ctx.base_path.display()
        )));
    }

    let mut orgs = find_orgs(&ctx.base_path)?;
    if let Some(name) = only {
        orgs.retain(|org| org.name == name);
        if orgs.is_empty() {
            return Err(ChaparralError::NotFound(format!(
                "no organization named {name:?} under {}",
                ctx.base_path.display()
            )));
        }
    }
    Ok(orgs)
}

pub(crate) fn org_skills(org: &Organization) -> Result<Vec<Skill>> {
    find_skills(&org.skills_path()).map_err(|err| {
        ChaparralError::NotFound(format!(
            "skills directory {} for {}: {err}",
            org.skills_path().display(),
            org.name
        ))
    })
}

/// Per-organization outcome in robot output.
#[derive(Debug, Serialize)]
pub(crate) struct OrgReport<T> {
    pub org: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> OrgReport<T> {
    pub fn from_result(org: &Organization, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self {
                org: org.name.clone(),
                result: Some(value),
                error: None,
            },
            Err(err) => {
                warn!(org = %org.name, error = %err, "organization failed");
                Self {
                    org: org.name.clone(),
                    result: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub const fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Turn failed organizations into the command's exit status.
pub(crate) fn finish<T>(reports: &[OrgReport<T>]) -> Result<()> {
    let failed = reports.iter().filter(|r| r.is_err()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(ChaparralError::Partial(format!(
            "{failed} of {} organizations failed",
            reports.len()
        )))
    }
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct OrgFilter {
    /// Only operate on this organization
    #[arg(long, value_name = "NAME")]
    pub org: Option<String>,
}

/// Robot output for a per-organization command, then its exit status.
pub(crate) fn emit_reports<T: Serialize>(reports: &[OrgReport<T>]) -> Result<()> {
    let failed = reports.iter().filter(|r| r.is_err()).count();
    if failed == 0 {
        emit_json(&robot_ok(reports))?;
    } else {
        emit_json(&robot_partial(reports, reports.len() - failed, failed))?;
    }
    finish(reports)
}
