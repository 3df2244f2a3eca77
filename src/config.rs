use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChaparralError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Defaults, then the global file (or the explicit one, which replaces
    /// it), then `CHAPARRAL_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env_string("CHAPARRAL_CONFIG").map(PathBuf::from));

        let patch = match explicit {
            Some(path) => Self::load_patch(&path)?,
            None => Self::load_global()?,
        };
        if let Some(patch) = patch {
            config.merge_patch(patch);
        }

        config.apply_overrides(env_string)?;
        config.expand_paths();

        Ok(config)
    }

    /// Location of the global config file, if the platform has a config dir.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chaparral/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = Self::global_path()
            .ok_or_else(|| ChaparralError::MissingConfig("config directory not found".to_string()))?;
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path).map_err(|err| {
            ChaparralError::Config(format!("read config {}: {err}", path.display()))
        })?;
        let patch = toml::from_str(&raw).map_err(|err| {
            ChaparralError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.publish {
            self.publish.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("CHAPARRAL_BASE") {
            self.paths.base = PathBuf::from(value);
        }
        if let Some(value) = lookup("CHAPARRAL_INSTALLED_PLUGINS") {
            self.paths.installed_plugins = PathBuf::from(value);
        }

        if let Some(value) = lookup("CHAPARRAL_PUBLISH_REMOTE") {
            self.publish.remote = value;
        }
        if let Some(value) = lookup("CHAPARRAL_PUBLISH_TOKEN_ENV") {
            self.publish.token_env = value;
        }
        if let Some(value) = lookup("CHAPARRAL_PUBLISH_CONFIRM") {
            self.publish.confirm = parse_bool("CHAPARRAL_PUBLISH_CONFIRM", &value)?;
        }

        if let Some(value) = lookup("CHAPARRAL_ROBOT") {
            if parse_bool("CHAPARRAL_ROBOT", &value)? {
                self.output.format = "json".to_string();
            }
        }

        match self.output.format.as_str() {
            "human" | "json" => Ok(()),
            other => Err(ChaparralError::Config(format!(
                "output.format must be \"human\" or \"json\", got {other:?}"
            ))),
        }
    }

    fn expand_paths(&mut self) {
        self.paths.base = expand_home(&self.paths.base);
        self.paths.installed_plugins = expand_home(&self.paths.installed_plugins);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for organizations.
    pub base: PathBuf,
    /// Plugin host's record of installed plugins.
    pub installed_plugins: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("~/code"),
            installed_plugins: PathBuf::from("~/.claude/plugins/installed_plugins.json"),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.base {
            self.base = value;
        }
        if let Some(value) = patch.installed_plugins {
            self.installed_plugins = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub remote: String,
    /// Name of the environment variable holding the push token.
    pub token_env: String,
    pub author_name: String,
    pub author_email: String,
    /// Ask before pushing.
    pub confirm: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            author_name: "chaparral".to_string(),
            author_email: "chaparral@local".to_string(),
            confirm: true,
        }
    }
}

impl PublishConfig {
    fn merge(&mut self, patch: PublishPatch) {
        if let Some(value) = patch.remote {
            self.remote = value;
        }
        if let Some(value) = patch.token_env {
            self.token_env = value;
        }
        if let Some(value) = patch.author_name {
            self.author_name = value;
        }
        if let Some(value) = patch.author_email {
            self.author_email = value;
        }
        if let Some(value) = patch.confirm {
            self.confirm = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub publish: Option<PublishPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub base: Option<PathBuf>,
    pub installed_plugins: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PublishPatch {
    pub remote: Option<String>,
    pub token_env: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub confirm: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub format: Option<String>,
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ChaparralError::Config(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}
