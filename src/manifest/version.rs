//! Patch-level version bumping for plugin descriptors

use std::path::Path;

use semver::Version;
use tracing::debug;

use super::{INITIAL_VERSION, PLUGIN_FILE};

/// Next version for a skill's plugin descriptor.
///
/// Reads `<brand_repo>/<skills_dir>/<skill>/plugin.json`. A missing or
/// unreadable file, a file without a `version` string, or a version that is not
/// plain `major.minor.patch` all yield the initial version. Otherwise the patch
/// component is incremented.
#[must_use]
pub fn bump_version(brand_repo: &Path, skills_dir: &str, skill_name: &str) -> String {
    let path = brand_repo.join(skills_dir).join(skill_name).join(PLUGIN_FILE);
    match published_version(&path) {
        Some(current) => next_patch(&current).unwrap_or_else(|| {
            debug!(path = %path.display(), version = %current, "unrecognised version");
            INITIAL_VERSION.to_string()
        }),
        None => INITIAL_VERSION.to_string(),
    }
}

/// The `version` string recorded in a descriptor on disk, if any.
#[must_use]
pub fn published_version(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    value.get("version")?.as_str().map(ToString::to_string)
}

/// `X.Y.Z` -> `X.Y.(Z+1)`. None for anything other than three plain integers.
#[must_use]
pub fn next_patch(version: &str) -> Option<String> {
    let parsed = Version::parse(version).ok()?;
    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return None;
    }
    let patch = parsed.patch.checked_add(1)?;
    Some(Version::new(parsed.major, parsed.minor, patch).to_string())
}
