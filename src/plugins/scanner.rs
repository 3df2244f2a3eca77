//! Reads the plugin host's installed-plugins record

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChaparralError, Result};
use crate::utils::fs::read_optional;

use super::{InstalledPlugin, parse_plugin_id};

const FILE_VERSION: u32 = 2;

/// On-disk shape of `installed_plugins.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPluginsFile {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub plugins: BTreeMap<String, Vec<PluginInstall>>,
}

impl Default for InstalledPluginsFile {
    fn default() -> Self {
        Self {
            version: FILE_VERSION,
            plugins: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginInstall {
    pub scope: String,
    pub install_path: String,
    pub version: String,
    pub installed_at: String,
    pub last_updated: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_commit_sha: String,
}

#[derive(Debug, Clone)]
pub struct PluginScanner {
    path: PathBuf,
}

impl PluginScanner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the record. A missing file reads as an empty record.
    pub fn read_installed(&self) -> Result<InstalledPluginsFile> {
        let Some(raw) = read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "no installed plugins file");
            return Ok(InstalledPluginsFile::default());
        };
        serde_json::from_str(&raw).map_err(|err| {
            ChaparralError::Config(format!("parse {}: {err}", self.path.display()))
        })
    }

    /// One entry per installation, ordered by plugin id.
    pub fn scan_installed(&self) -> Result<Vec<InstalledPlugin>> {
        let file = self.read_installed()?;
        let mut plugins = Vec::new();
        for (plugin_id, installs) in file.plugins {
            let (name, marketplace) = parse_plugin_id(&plugin_id);
            for install in installs {
                plugins.push(InstalledPlugin {
                    plugin_id: plugin_id.clone(),
                    name: name.clone(),
                    marketplace: marketplace.clone(),
                    version: install.version,
                    scope: install.scope,
                    project_path: install.project_path,
                    install_path: install.install_path,
                });
            }
        }
        Ok(plugins)
    }
}

/// Installations visible from `repo`: every user-scoped one, plus project-scoped
/// ones whose project path resolves to the same directory.
#[must_use]
pub fn plugins_for_repo(plugins: &[InstalledPlugin], repo: &Path) -> Vec<InstalledPlugin> {
    let repo = normalize(repo);
    plugins
        .iter()
        .filter(|plugin| match plugin.scope.as_str() {
            "user" => true,
            "project" => {
                !plugin.project_path.is_empty() && normalize(Path::new(&plugin.project_path)) == repo
            }
            _ => false,
        })
        .cloned()
        .collect()
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.components().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "version": 2,
  "plugins": {
    "reviewer@acme": [
      {"scope": "project", "installPath": "/p/reviewer", "version": "0.1.1",
       "installedAt": "2026-01-01T00:00:00Z", "lastUpdated": "2026-01-02T00:00:00Z",
       "projectPath": "PROJECT"}
    ],
    "linter@acme": [
      {"scope": "user", "installPath": "/p/linter", "version": "2.0.0",
       "installedAt": "2026-01-01T00:00:00Z", "lastUpdated": "2026-01-01T00:00:00Z"}
    ]
  }
}"#;

    fn scanner_with(dir: &Path, project: &Path) -> PluginScanner {
        let path = dir.join("installed_plugins.json");
        let content = SAMPLE.replace("PROJECT", &project.display().to_string());
        std::fs::write(&path, content).unwrap();
        PluginScanner::new(path)
    }

    #[test]
    fn missing_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = PluginScanner::new(dir.path().join("absent.json"));
        let file = scanner.read_installed().unwrap();
        assert_eq!(file.version, 2);
        assert!(file.plugins.is_empty());
        assert!(scanner.scan_installed().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installed_plugins.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(PluginScanner::new(path).read_installed().is_err());
    }

    #[test]
    fn scans_configured_path_sorted_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("widget");
        std::fs::create_dir_all(&repo).unwrap();
        let plugins = scanner_with(dir.path(), &repo).scan_installed().unwrap();

        let ids: Vec<&str> = plugins.iter().map(|p| p.plugin_id.as_str()).collect();
        assert_eq!(ids, vec!["linter@acme", "reviewer@acme"]);
        assert_eq!(plugins[1].name, "reviewer");
        assert_eq!(plugins[1].marketplace, "acme");
        assert_eq!(plugins[1].version, "0.1.1");
    }

    #[test]
    fn filters_by_repo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("widget");
        let other = dir.path().join("gadget");
        std::fs::create_dir_all(&repo).unwrap();
        std::fs::create_dir_all(&other).unwrap();
        let plugins = scanner_with(dir.path(), &repo).scan_installed().unwrap();

        let for_repo = plugins_for_repo(&plugins, &repo);
        assert_eq!(for_repo.len(), 2);

        let for_other = plugins_for_repo(&plugins, &other);
        assert_eq!(for_other.len(), 1);
        assert_eq!(for_other[0].scope, "user");
    }

    #[cfg(unix)]
    #[test]
    fn project_match_resolves_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("widget");
        std::fs::create_dir_all(&repo).unwrap();
        let alias = dir.path().join("alias");
        std::os::unix::fs::symlink(&repo, &alias).unwrap();

        let plugins = scanner_with(dir.path(), &alias).scan_installed().unwrap();
        assert_eq!(plugins_for_repo(&plugins, &repo).len(), 2);
    }
}
