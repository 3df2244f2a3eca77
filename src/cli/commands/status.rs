//! chaparral status - show link state per skill

use std::collections::BTreeMap;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;
use crate::linker::{self, LinkState, LinkStatus};

use super::{OrgFilter, OrgReport, discover, emit_reports, finish};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub filter: OrgFilter,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    let reports: Vec<OrgReport<Vec<LinkStatus>>> = orgs
        .iter()
        .map(|org| OrgReport::from_result(org, linker::status(org)))
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
        if let Some(error) = &report.error {
            layout.push_line(format!("{} {error}", "error:".red()));
        }
        if let Some(statuses) = &report.result {
            for (skill, entries) in group_by_skill(statuses) {
                layout.push_line(skill.bold().to_string());
                for status in entries {
                    layout.bullet(&format!("{:<10} {}", state_label(status.state), status.repo));
                }
            }
        }
        layout.blank();
    }
    emit_human(layout);

    finish(&reports)
}

/// Statuses keyed by skill name, repos in discovery order.
fn group_by_skill(statuses: &[LinkStatus]) -> BTreeMap<&str, Vec<&LinkStatus>> {
    let mut grouped: BTreeMap<&str, Vec<&LinkStatus>> = BTreeMap::new();
    for status in statuses {
        grouped.entry(status.skill.as_str()).or_default().push(status);
    }
    grouped
}

fn state_label(state: LinkState) -> String {
    let label = state.as_str();
    match state {
        LinkState::Linked => label.green().to_string(),
        LinkState::Stale => label.yellow().to_string(),
        LinkState::Missing => label.dimmed().to_string(),
        LinkState::Conflict => label.red().to_string(),
    }
}
