//! Organization and skill snapshots
//!
//! An organization is a directory holding one brand repository (the one with a
//! `chaparral.json`) and any number of sibling repositories. Both types are
//! rebuilt on every discovery pass and never persisted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChaparralError, Result};

/// Name of the brand repository's configuration file.
pub const MANIFEST_FILE: &str = "chaparral.json";

/// Metadata file every skill directory must contain.
pub const SKILL_FILE: &str = "SKILL.md";

/// Name of the shared instruction file linked into the org root.
pub const CLAUDE_MD: &str = "CLAUDE.md";

/// Repo label used for organization-level link results.
pub const ORG_LABEL: &str = "(org)";

/// Per-repo directory that receives skill links.
pub const LINK_DIR: &str = ".claude/skills";

/// `chaparral.json` as found in a brand repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandManifest {
    pub org: String,
    pub claude_md: String,
    pub skills_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl BrandManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ChaparralError::Config(format!("read {}: {err}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|err| ChaparralError::Config(format!("parse {}: {err}", path.display())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub name: String,
    /// Absolute path to the organization directory.
    pub path: PathBuf,
    /// Directory name of the brand repository inside `path`.
    pub brand_repo: String,
    pub manifest: BrandManifest,
    /// Sibling repository names, excluding the brand repo and excluded names.
    pub repos: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn brand_repo_path(&self) -> PathBuf {
        self.path.join(&self.brand_repo)
    }

    #[must_use]
    pub fn skills_path(&self) -> PathBuf {
        self.brand_repo_path().join(&self.manifest.skills_dir)
    }

    /// Source of the shared instruction file inside the brand repo.
    #[must_use]
    pub fn claude_md_path(&self) -> PathBuf {
        self.brand_repo_path().join(&self.manifest.claude_md)
    }

    /// Where the shared instruction file is linked to.
    #[must_use]
    pub fn claude_md_link(&self) -> PathBuf {
        self.path.join(CLAUDE_MD)
    }

    #[must_use]
    pub fn repo_link_dir(&self, repo: &str) -> PathBuf {
        self.path.join(repo).join(LINK_DIR)
    }

    #[must_use]
    pub fn is_excluded(&self, repo: &str) -> bool {
        self.manifest.exclude.iter().any(|ex| ex == repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: String,
    /// Absolute path to the skill directory.
    pub path: PathBuf,
}

impl Skill {
    #[must_use]
    pub fn skill_md(&self) -> PathBuf {
        self.path.join(SKILL_FILE)
    }
}
