//! chaparral unlink - remove managed symlinks

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;
use crate::linker::{self, LinkAction, LinkResult};

use super::sync::format_result;
use super::{OrgFilter, OrgReport, discover, emit_reports, finish};

#[derive(Args, Debug)]
pub struct UnlinkArgs {
    #[command(flatten)]
    pub filter: OrgFilter,
}

pub fn run(ctx: &AppContext, args: &UnlinkArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    let reports: Vec<OrgReport<Vec<LinkResult>>> = orgs
        .iter()
        .map(|org| OrgReport::from_result(org, linker::unlink(org)))
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
        if let Some(results) = &report.result {
            for result in results {
                layout.bullet(&format_result(result));
            }
            layout.push_line(format!(
                "{} removed",
                linker::count(results, LinkAction::Removed)
            ));
        }
        layout.blank();
    }
    emit_human(layout);

    finish(&reports)
}
