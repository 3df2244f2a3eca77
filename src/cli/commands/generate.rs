//! chaparral generate - preview generated descriptors

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::core::org::Organization;
use crate::error::Result;
use crate::manifest::MARKETPLACE_PATH;
use crate::publish::{ChangeKind, FileChange, diff_manifests};

use super::{OrgFilter, OrgReport, discover, emit_reports, finish, org_skills};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub filter: OrgFilter,

    /// Include the marketplace catalog
    #[arg(long)]
    pub marketplace: bool,
}

#[derive(Debug, Serialize)]
struct GeneratedFile {
    path: String,
    kind: ChangeKind,
    content: String,
}

pub fn run(ctx: &AppContext, args: &GenerateArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    let reports: Vec<OrgReport<Vec<GeneratedFile>>> = orgs
        .iter()
        .map(|org| OrgReport::from_result(org, generate(org, args.marketplace)))
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
            layout.push_line(format!("{} ({})", file.path.bold(), file.kind.as_str().dimmed()));
            layout.push_line(file.content.trim_end());
            layout.blank();
        }
    }
    emit_human(layout);

    finish(&reports)
}

fn generate(org: &Organization, marketplace: bool) -> Result<Vec<GeneratedFile>> {
    let skills = org_skills(org)?;
    let files = diff_manifests(org, &skills)?
        .into_iter()
        .filter(|change| marketplace || change.path != MARKETPLACE_PATH)
        .map(|FileChange { path, kind, new_content, .. }| GeneratedFile {
            path,
            kind,
            content: new_content,
        })
        .collect();
    Ok(files)
}
