//! chaparral plugins - plugin status for a repository

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::{ChaparralError, Result};
use crate::plugins::{PluginHost, PluginScanner, PluginStatus, merge_status};

#[derive(Args, Debug)]
pub struct PluginsArgs {
    /// Repository directory
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Install a plugin (`name@marketplace`) into the repository first
    #[arg(long, value_name = "ID")]
    pub install: Option<String>,

    /// Only read the local install record; don't ask the plugin host
    #[arg(long, conflicts_with = "install")]
    pub offline: bool,
}

#[derive(Debug, Serialize)]
struct PluginsReport {
    repo: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    installed_output: Option<String>,
    plugins: Vec<PluginStatus>,
}

pub fn run(ctx: &AppContext, args: &PluginsArgs) -> Result<()> {
    if !args.repo.is_dir() {
        return Err(ChaparralError::NotFound(format!(
            "repository {} does not exist",
            args.repo.display()
        )));
    }

    let host = PluginHost::new();
    let installed_output = args
        .install
        .as_deref()
        .map(|id| host.install(id, &args.repo))
        .transpose()?;

    let scanner = PluginScanner::new(&ctx.config.paths.installed_plugins);
    let installed = scanner.scan_installed()?;
    let available = if args.offline {
        Vec::new()
    } else {
        host.query_available().unwrap_or_else(|err| {
            warn!(error = %err, "marketplace query failed; showing installed plugins only");
            Vec::new()
        })
    };
    let plugins = merge_status(&installed, &available, &args.repo);

    if !ctx.is_human() {
        return emit_json(&robot_ok(PluginsReport {
            repo: args.repo.clone(),
            installed_output,
            plugins,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Plugins for {}", args.repo.display()));
    if let Some(output) = &installed_output {
        layout.push_line(output.trim_end());
        layout.blank();
    }
    if plugins.is_empty() {
        layout.push_line("No plugins installed or available");
    }
    for plugin in &plugins {
        layout.push_line(format_status(plugin));
        if !plugin.description.is_empty() {
            layout.bullet(&plugin.description.dimmed().to_string());
        }
    }
    emit_human(layout);
    Ok(())
}

fn format_status(plugin: &PluginStatus) -> String {
    let mark = if plugin.installed {
        "●".green()
    } else {
        "○".dimmed()
    };
    let mut line = format!("{mark} {}", plugin.plugin_id.bold());
    if plugin.installed {
        line.push_str(&format!(" v{} [{}]", plugin.version, plugin.scope));
        if plugin.available && plugin.available_version != plugin.version {
            line.push_str(&format!(
                " {}",
                format!("(v{} available)", plugin.available_version).yellow()
            ));
        }
    } else if !plugin.available_version.is_empty() {
        line.push_str(&format!(" v{}", plugin.available_version));
    }
    line
}
