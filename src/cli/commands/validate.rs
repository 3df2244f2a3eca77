//! chaparral validate - check skill metadata

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_partial};
use crate::core::validation::{ValidationResult, validate_org};
use crate::error::{ChaparralError, Result};

use super::{OrgFilter, OrgReport, discover, emit_reports, finish};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub filter: OrgFilter,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let orgs = discover(ctx, args.filter.org.as_deref())?;
    let reports: Vec<OrgReport<Vec<ValidationResult>>> = orgs
        .iter()
        .map(|org| OrgReport::from_result(org, validate_org(org)))
        .collect();

    let checked: Vec<&ValidationResult> = reports
        .iter()
        .filter_map(|report| report.result.as_ref())
        .flatten()
        .collect();
    let invalid = checked.iter().filter(|result| !result.is_valid()).count();

    if ctx.is_human() {
        render(&reports);
        finish(&reports)?;
    } else if invalid > 0 {
        emit_json(&robot_partial(&reports, checked.len() - invalid, invalid))?;
        return Err(ChaparralError::Partial(format!(
            "{invalid} skill(s) with errors"
        )));
    } else {
        emit_reports(&reports)?;
    }

    if invalid > 0 {
        return Err(ChaparralError::ValidationFailed(format!(
            "{invalid} skill(s) with errors"
        )));
    }
    Ok(())
}

fn render(reports: &[OrgReport<Vec<ValidationResult>>]) {
    let mut layout = HumanLayout::new();
    for report in reports {
        layout.section(&report.org);
        if let Some(error) = &report.error {
            layout.push_line(format!("{} {error}", "error:".red()));
        }
        for result in report.result.iter().flatten() {
            let mark = if !result.is_valid() {
                "✗".red()
            } else if result.warnings.is_empty() {
                "✓".green()
            } else {
                "!".yellow()
            };
            layout.push_line(format!("{mark} {}", result.skill));
            for error in &result.errors {
                layout.bullet(&format!("{} {error}", "error:".red()));
            }
            for warning in &result.warnings {
                layout.bullet(&format!("{} {warning}", "warning:".yellow()));
            }
        }
        layout.blank();
    }
    emit_human(layout);
}
