//! chaparral publish - write descriptors and push the marketplace

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, confirm, emit_human};
use crate::core::org::Organization;
use crate::error::{ChaparralError, Result};
use crate::publish::{
    ChangeKind, FileChange, FreshnessResult, GitCollaborator, PublishOutcome, WrittenFile,
    check_freshness, diff_manifests, has_changes, publish, publish_version, write_manifests,
};

use super::{OrgFilter, OrgReport, discover, emit_reports, finish, org_skills};

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub filter: OrgFilter,

    /// Report which skills changed since their descriptor was written
    #[arg(long, conflicts_with = "write_only")]
    pub check: bool,

    /// Write descriptors without committing or pushing
    #[arg(long)]
    pub write_only: bool,

    /// Don't ask before pushing
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(ctx: &AppContext, args: &PublishArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    if args.check {
        run_check(ctx, &orgs)
    } else if args.write_only {
        run_write(ctx, &orgs)
    } else {
        run_publish(ctx, &orgs, args.yes)
    }
}

fn run_check(ctx: &AppContext, orgs: &[Organization]) -> Result<()> {
    let reports: Vec<OrgReport<Vec<FreshnessResult>>> = orgs
        .iter()
        .map(|org| {
            let result = org_skills(org).and_then(|skills| check_freshness(org, &skills));
            OrgReport::from_result(org, result)
        })
        .collect();

    if !ctx.is_human() {
        return emit_reports(&reports);
    }

    let mut layout = HumanLayout::new();
    for report in &reports {
        layout.section(&report.org);
        if let Some(error) = &report.error {
            layout.push_line(format!("{} {error}", "error:".red()));
        }
        for result in report.result.iter().flatten() {
            let version = if result.published_version.is_empty() {
                "never published".dimmed().to_string()
            } else {
                format!("v{}", result.published_version)
            };
            let state = if result.stale {
                "stale".yellow()
            } else {
                "fresh".green()
            };
            layout.bullet(&format!("{state:<6} {} ({version})", result.skill));
        }
        layout.blank();
    }
    emit_human(layout);
    finish(&reports)
}

fn run_write(ctx: &AppContext, orgs: &[Organization]) -> Result<()> {
    let reports: Vec<OrgReport<Vec<WrittenFile>>> = orgs
        .iter()
        .map(|org| {
            let result = org_skills(org)
                .and_then(|skills| write_manifests(org, &skills))
                .and_then(crate::publish::WriteOutcome::into_result);
            OrgReport::from_result(org, result)
        })
        .collect();

    if !ctx.is_human() {
        return emit_reports(&reports);
    }

    let mut layout = HumanLayout::new();
    for report in &reports {
        layout.section(&report.org);
        if let Some(error) = &report.error {
            layout.push_line(format!("{} {error}", "error:".red()));
        }
        for file in report.result.iter().flatten() {
            let label = if file.is_new { "new".green() } else { "updated".normal() };
            layout.bullet(&format!("{label:<8} {}", file.path));
        }
        layout.blank();
    }
    emit_human(layout);
    finish(&reports)
}

fn run_publish(ctx: &AppContext, orgs: &[Organization], yes: bool) -> Result<()> {
    let git = ctx.git();
    let needs_confirm = ctx.config.publish.confirm && !yes;
    if needs_confirm && !ctx.is_human() {
        return Err(ChaparralError::Config(
            "publishing needs confirmation; pass --yes or set publish.confirm = false".to_string(),
        ));
    }

    let mut reports = Vec::with_capacity(orgs.len());
    for org in orgs {
        let result = publish_org(ctx, org, &git, needs_confirm);
        if ctx.is_human() {
            render_outcome(org, &result);
        }
        reports.push(OrgReport::from_result(org, result));
    }

    if !ctx.is_human() {
        return emit_reports(&reports);
    }
    finish(&reports)
}

fn publish_org(
    ctx: &AppContext,
    org: &Organization,
    git: &dyn GitCollaborator,
    needs_confirm: bool,
) -> Result<Option<PublishOutcome>> {
    let skills = org_skills(org)?;

    if needs_confirm {
        let changes = diff_manifests(org, &skills)?;
        if !has_changes(&changes) {
            return Ok(Some(PublishOutcome::UpToDate));
        }
        let remote = git
            .remote_url(&org.brand_repo_path())
            .unwrap_or_else(|_| ctx.config.publish.remote.clone());
        preview(org, &changes, &remote);
        if !confirm("Publish?")? {
            return Ok(None);
        }
    }

    publish(org, &skills, git).map(Some)
}

fn preview(org: &Organization, changes: &[FileChange], remote: &str) {
    let mut layout = HumanLayout::new();
    layout.section(&org.name);
    layout.kv("Version", &format!("v{}", publish_version(changes)));
    layout.kv("Remote", remote);
    for change in changes.iter().filter(|c| c.kind != ChangeKind::Unchanged) {
        let kind = match change.kind {
            ChangeKind::New => change.kind.as_str().green(),
            _ => change.kind.as_str().yellow(),
        };
        layout.bullet(&format!("{kind:<9} {}", change.path));
    }
    emit_human(layout);
}

fn render_outcome(org: &Organization, result: &Result<Option<PublishOutcome>>) {
    let line = match result {
        Ok(None) => format!("{}: cancelled", org.name),
        Ok(Some(PublishOutcome::UpToDate)) => format!("{}: already up to date", org.name),
        Ok(Some(PublishOutcome::NothingToCommit { version, .. })) => {
            format!("{}: v{version} written, nothing new to commit", org.name)
        }
        Ok(Some(PublishOutcome::Published { version, written })) => format!(
            "{} {}: published v{version} ({} files)",
            "✓".green(),
            org.name,
            written.len()
        ),
        Err(err) => format!("{} {}: {err}", "✗".red(), org.name),
    };
    println!("{line}");
}
