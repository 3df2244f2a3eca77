//! Staleness of published plugin descriptors

use std::path::Path;
use std::time::SystemTime;

use serde::Serialize;
use walkdir::WalkDir;

use crate::core::org::{Organization, Skill};
use crate::error::Result;
use crate::manifest::{PLUGIN_FILE, published_version};
use crate::utils::fs::modified_optional;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessResult {
    pub skill: String,
    pub stale: bool,
    /// Empty if the skill has never been published.
    pub published_version: String,
}

/// Compare each skill's source files against its published `plugin.json`.
pub fn check_freshness(_org: &Organization, skills: &[Skill]) -> Result<Vec<FreshnessResult>> {
    skills.iter().map(check_skill).collect()
}

fn check_skill(skill: &Skill) -> Result<FreshnessResult> {
    let descriptor = skill.path.join(PLUGIN_FILE);
    let Some(published_at) = modified_optional(&descriptor)? else {
        return Ok(FreshnessResult {
            skill: skill.name.clone(),
            stale: true,
            published_version: String::new(),
        });
    };

    let stale = newest_source_mtime(&skill.path)?.is_some_and(|source| source > published_at);

    Ok(FreshnessResult {
        skill: skill.name.clone(),
        stale,
        published_version: published_version(&descriptor).unwrap_or_default(),
    })
}

/// Newest modification time among the skill's files, ignoring the generated
/// descriptor itself.
fn newest_source_mtime(skill_dir: &Path) -> Result<Option<SystemTime>> {
    let mut newest: Option<SystemTime> = None;
    for entry in WalkDir::new(skill_dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.depth() == 1 && entry.file_name() == PLUGIN_FILE {
            continue;
        }
        let modified = entry.metadata().map_err(std::io::Error::from)?.modified()?;
        newest = Some(newest.map_or(modified, |current| current.max(modified)));
    }
    Ok(newest)
}
