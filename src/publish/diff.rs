//! Read-only diff of generated manifests against what is on disk

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::org::{Organization, Skill};
use crate::error::Result;
use crate::manifest::{
    MARKETPLACE_PATH, PLUGIN_FILE, bump_version, generate_marketplace, generate_plugin,
    to_pretty_json,
};
use crate::manifest::generator::plugin_source;
use crate::utils::fs::read_optional_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    New,
    Modified,
    Unchanged,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// POSIX path relative to the brand repository root.
    pub path: String,
    pub kind: ChangeKind,
    /// Empty when the file doesn't exist yet.
    pub old_content: String,
    pub new_content: String,
}

/// A generated file together with where it lives on disk.
#[derive(Debug, Clone)]
pub(crate) struct PlannedFile {
    pub abs_path: PathBuf,
    pub change: FileChange,
}

/// What writing manifests for `skills` would change, without writing.
///
/// Plugin descriptors come first in skill order, followed by the marketplace
/// catalog. A skill whose existing `plugin.json` was not generated by this
/// tool is left out of both.
pub fn diff_manifests(org: &Organization, skills: &[Skill]) -> Result<Vec<FileChange>> {
    Ok(plan(org, skills)?
        .into_iter()
        .map(|planned| planned.change)
        .collect())
}

/// Whether a descriptor on disk looks like one this tool generated.
#[must_use]
pub fn is_managed_plugin(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| value.as_object().map(|obj| obj.contains_key("skills")))
        .unwrap_or(false)
}

pub(crate) fn plan(org: &Organization, skills: &[Skill]) -> Result<Vec<PlannedFile>> {
    let brand = org.brand_repo_path();
    let mut planned = Vec::with_capacity(skills.len() + 1);
    let mut managed = Vec::with_capacity(skills.len());
    let mut versions = HashMap::new();

    for skill in skills {
        let abs_path = skill.path.join(PLUGIN_FILE);
        let old = match read_optional_bytes(&abs_path)? {
            None => None,
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(existing) if is_managed_plugin(&existing) => Some(existing),
                _ => {
                    warn!(skill = %skill.name, path = %abs_path.display(), "skipping plugin.json not generated by chaparral");
                    continue;
                }
            },
        };

        let version = bump_version(&brand, &org.manifest.skills_dir, &skill.name);
        let new_content = to_pretty_json(&generate_plugin(skill, &version)?)?;
        let rel = format!(
            "{}/{PLUGIN_FILE}",
            plugin_source(&org.manifest.skills_dir, &skill.name).trim_start_matches("./")
        );
        debug!(skill = %skill.name, %version, "planned plugin descriptor");

        planned.push(PlannedFile {
            abs_path,
            change: classify(rel, old, new_content),
        });
        versions.insert(skill.name.clone(), version);
        managed.push(skill.clone());
    }

    let abs_path = brand.join(MARKETPLACE_PATH);
    let new_content = to_pretty_json(&generate_marketplace(org, &managed, &versions)?)?;
    let change = match read_optional_bytes(&abs_path)?.map(String::from_utf8) {
        None => classify(MARKETPLACE_PATH.to_string(), None, new_content),
        Some(Ok(old)) => classify(MARKETPLACE_PATH.to_string(), Some(old), new_content),
        Some(Err(err)) => {
            warn!(path = %abs_path.display(), "existing marketplace is not valid UTF-8");
            FileChange {
                path: MARKETPLACE_PATH.to_string(),
                kind: ChangeKind::Modified,
                old_content: String::from_utf8_lossy(err.as_bytes()).into_owned(),
                new_content,
            }
        }
    };
    planned.push(PlannedFile { abs_path, change });

    Ok(planned)
}

fn classify(path: String, old: Option<String>, new_content: String) -> FileChange {
    let (kind, old_content) = match old {
        None => (ChangeKind::New, String::new()),
        Some(old) if old == new_content => (ChangeKind::Unchanged, old),
        Some(old) => (ChangeKind::Modified, old),
    };
    FileChange {
        path,
        kind,
        old_content,
        new_content,
    }
}
