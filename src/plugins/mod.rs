//! Plugin host integration: what is installed, what is available

pub mod host;
pub mod scanner;

pub use host::{AvailablePlugin, PluginHost};
pub use scanner::{InstalledPluginsFile, PluginInstall, PluginScanner, plugins_for_repo};

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

/// One installation of a plugin, flattened out of the installed-plugins file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPlugin {
    /// `name@marketplace`
    pub plugin_id: String,
    pub name: String,
    pub marketplace: String,
    pub version: String,
    /// `user` or `project`
    pub scope: String,
    pub project_path: String,
    pub install_path: String,
}

/// Installed state joined with marketplace availability, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginStatus {
    pub plugin_id: String,
    pub name: String,
    pub marketplace: String,
    /// Installed version; empty if not installed.
    pub version: String,
    /// Marketplace version; empty if not offered.
    pub available_version: String,
    pub scope: String,
    pub installed: bool,
    pub available: bool,
    pub description: String,
}

/// Split `name@marketplace`. Without an `@` the marketplace is empty.
#[must_use]
pub fn parse_plugin_id(id: &str) -> (String, String) {
    match id.split_once('@') {
        Some((name, marketplace)) => (name.to_string(), marketplace.to_string()),
        None => (id.to_string(), String::new()),
    }
}

/// Plugins that apply to `repo` first, then marketplace entries not installed.
#[must_use]
pub fn merge_status(
    installed: &[InstalledPlugin],
    available: &[AvailablePlugin],
    repo: &Path,
) -> Vec<PluginStatus> {
    let by_id: HashMap<&str, &AvailablePlugin> = available
        .iter()
        .map(|plugin| (plugin.plugin_id.as_str(), plugin))
        .collect();

    let mut seen = HashSet::new();
    let mut statuses = Vec::new();

    for plugin in plugins_for_repo(installed, repo) {
        seen.insert(plugin.plugin_id.clone());
        let mut status = PluginStatus {
            plugin_id: plugin.plugin_id.clone(),
            name: plugin.name.clone(),
            marketplace: plugin.marketplace.clone(),
            version: plugin.version.clone(),
            scope: plugin.scope.clone(),
            installed: true,
            ..PluginStatus::default()
        };
        if let Some(offer) = by_id.get(plugin.plugin_id.as_str()) {
            status.available = true;
            status.available_version.clone_from(&offer.version);
            status.description.clone_from(&offer.description);
        }
        statuses.push(status);
    }

    for offer in available {
        if seen.contains(&offer.plugin_id) {
            continue;
        }
        statuses.push(PluginStatus {
            plugin_id: offer.plugin_id.clone(),
            name: offer.name.clone(),
            marketplace: offer.marketplace.clone(),
            available_version: offer.version.clone(),
            available: true,
            description: offer.description.clone(),
            ..PluginStatus::default()
        });
    }

    statuses
}
