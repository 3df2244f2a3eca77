//! Thin wrapper over the plugin host's command line

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChaparralError, Result};

/// A plugin offered by a configured marketplace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailablePlugin {
    #[serde(rename = "pluginId")]
    pub plugin_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "marketplaceName")]
    pub marketplace: String,
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    available: Vec<AvailablePlugin>,
}

#[derive(Debug, Clone)]
pub struct PluginHost {
    binary: PathBuf,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::with_binary("claude")
    }

    /// Use a different host executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Plugins every configured marketplace offers.
    pub fn query_available(&self) -> Result<Vec<AvailablePlugin>> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["plugin", "list", "--available", "--json"]);
        let output = self.run(cmd, "querying marketplace")?;
        parse_available(&output.stdout)
    }

    /// Install `plugin_id` with project scope, running inside `repo`.
    /// Returns the host's combined output.
    pub fn install(&self, plugin_id: &str, repo: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["plugin", "install", plugin_id, "--scope", "project"])
            .current_dir(repo);
        let output = self.run(cmd, &format!("installing {plugin_id}"))?;
        info!(plugin = plugin_id, repo = %repo.display(), "installed plugin");
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }

    fn run(&self, mut cmd: Command, what: &str) -> Result<Output> {
        debug!(binary = %self.binary.display(), args = ?cmd.get_args().collect::<Vec<_>>(), "running plugin host");
        let output = cmd.output().map_err(|err| {
            ChaparralError::CommandFailed(format!(
                "{what}: failed to execute {}: {err}",
                self.binary.display()
            ))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChaparralError::CommandFailed(format!(
                "{what}: {}",
                stderr.trim()
            )));
        }
        Ok(output)
    }
}

impl Default for PluginHost {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_available(output: &[u8]) -> Result<Vec<AvailablePlugin>> {
    if output.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let response: ListResponse = serde_json::from_slice(output).map_err(|err| {
        ChaparralError::CommandFailed(format!("parsing marketplace response: {err}"))
    })?;
    Ok(response.available)
}
