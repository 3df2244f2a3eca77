//! Organization and skill discovery
//!
//! A flat directory walk: orgs are the directories under the base path, the
//! brand repo is the first child carrying a `chaparral.json`, and skills are
//! the children of the brand repo's skills directory that hold a `SKILL.md`.

use std::path::Path;

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;
use crate::utils::git::is_repo;

use super::org::{BrandManifest, MANIFEST_FILE, Organization, SKILL_FILE, Skill};

/// Scan `base` for organization directories.
pub fn find_orgs(base: &Path) -> Result<Vec<Organization>> {
    let mut orgs = Vec::new();
    for entry in child_dirs(base)? {
        match load_org(entry.path()) {
            Ok(Some(org)) => {
                debug!(org = %org.name, path = %org.path.display(), "discovered org");
                orgs.push(org);
            }
            Ok(None) => trace!(path = %entry.path().display(), "no brand repo"),
            Err(err) => debug!(path = %entry.path().display(), error = %err, "skipping unreadable dir"),
        }
    }
    Ok(orgs)
}

/// Build the organization rooted at `org_path`, if one of its children is a
/// brand repository.
pub fn load_org(org_path: &Path) -> Result<Option<Organization>> {
    let children = child_dirs(org_path)?;

    for entry in &children {
        let manifest_path = entry.path().join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            continue;
        }
        let manifest = match BrandManifest::load(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                debug!(error = %err, "ignoring unparseable manifest");
                continue;
            }
        };

        let brand_repo = file_name(entry);
        let repos = children
            .iter()
            .map(file_name)
            .filter(|name| *name != brand_repo && !manifest.exclude.contains(name))
            .filter(|name| is_repo(org_path.join(name)))
            .collect();

        return Ok(Some(Organization {
            name: manifest.org.clone(),
            path: org_path.to_path_buf(),
            brand_repo,
            manifest,
            repos,
        }));
    }

    Ok(None)
}

/// Every skill directory (containing `SKILL.md`) under `skills_dir`.
///
/// An unreadable skills directory is an error; callers treat it as fatal for
/// the whole organization.
pub fn find_skills(skills_dir: &Path) -> Result<Vec<Skill>> {
    let skills = child_dirs(skills_dir)?
        .into_iter()
        .filter(|entry| entry.path().join(SKILL_FILE).is_file())
        .map(|entry| Skill {
            name: file_name(&entry),
            path: entry.path().to_path_buf(),
        })
        .collect();
    Ok(skills)
}

/// Non-hidden direct child directories of `dir`, sorted by name.
fn child_dirs(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
            dirs.push(entry);
        }
    }
    Ok(dirs)
}

fn file_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}
