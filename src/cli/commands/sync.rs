//! chaparral sync - link shared content into sibling repos

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;
use crate::linker::{self, LinkAction, LinkResult};

use super::{OrgFilter, OrgReport, discover, emit_reports, finish};

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub filter: OrgFilter,
}

pub fn run(ctx: &AppContext, args: &SyncArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    let reports: Vec<OrgReport<Vec<LinkResult>>> = orgs
        .iter()
        .map(|org| OrgReport::from_result(org, linker::sync(org)))
        .collect();

    if !ctx.is_human() {
        return emit_reports(&reports);
    }

    let mut layout = HumanLayout::new();
    if reports.is_empty() {
        layout.push_line(format!(
            "No organizations found under {}",
            ctx.base_path.display()
        ));
    }
    for report in &reports {
        layout.section(&report.org);
        match (&report.result, &report.error) {
            (Some(results), _) => render(&mut layout, results),
            (None, Some(error)) => {
                layout.push_line(format!("{} {error}", "error:".red()));
            }
            (None, None) => {}
        }
        layout.blank();
    }
    emit_human(layout);

    finish(&reports)
}

fn render(layout: &mut HumanLayout, results: &[LinkResult]) {
    for result in results.iter().filter(|r| r.action != LinkAction::Exists) {
        layout.bullet(&format_result(result));
    }
    layout.push_line(format!(
        "{} linked, {} already up to date",
        linker::count(results, LinkAction::Created),
        linker::count(results, LinkAction::Exists)
    ));
}

pub(crate) fn format_result(result: &LinkResult) -> String {
    let action = match result.action {
        LinkAction::Created | LinkAction::Removed => result.action.as_str().green(),
        LinkAction::Exists => result.action.as_str().dimmed(),
        LinkAction::Skipped => result.action.as_str().yellow(),
        LinkAction::Error => result.action.as_str().red(),
    };
    let mut line = format!("{action:<8} {}/{}", result.repo, result.skill);
    if let Some(detail) = &result.detail {
        line.push_str(&format!(" ({detail})"));
    }
    line
}
