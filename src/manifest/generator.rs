//! Plugin and marketplace descriptor generation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::frontmatter::Frontmatter;
use crate::core::org::{Organization, Skill};
use crate::error::{ChaparralError, Result};

use super::INITIAL_VERSION;

/// Value of `skills` in every generated plugin descriptor. Its presence is
/// also how a generated descriptor is told apart from a hand-written one.
pub const SKILLS_ROOT: &str = "./";

/// `<skill>/plugin.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skills: String,
}

/// `<brand>/.claude-plugin/marketplace.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    pub name: String,
    pub owner: MarketplaceOwner,
    pub plugins: Vec<MarketplacePlugin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceOwner {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplacePlugin {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub version: String,
}

/// Build the plugin descriptor for `skill` at `version`.
pub fn generate_plugin(skill: &Skill, version: &str) -> Result<PluginManifest> {
    let fm = read_frontmatter(skill)?;
    Ok(PluginManifest {
        name: fm.name,
        description: fm.description,
        version: version.to_string(),
        license: fm.license,
        skills: SKILLS_ROOT.to_string(),
    })
}

/// Build the marketplace catalog for `skills`.
///
/// `versions` maps skill directory names to the version each plugin entry
/// should carry; skills missing from it get the initial version. Any skill
/// whose metadata can't be read fails the whole catalog.
pub fn generate_marketplace(
    org: &Organization,
    skills: &[Skill],
    versions: &HashMap<String, String>,
) -> Result<MarketplaceManifest> {
    let plugins = skills
        .iter()
        .map(|skill| {
            let fm = read_frontmatter(skill)?;
            Ok(MarketplacePlugin {
                name: fm.name,
                source: plugin_source(&org.manifest.skills_dir, &skill.name),
                description: fm.description,
                version: versions
                    .get(&skill.name)
                    .cloned()
                    .unwrap_or_else(|| INITIAL_VERSION.to_string()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MarketplaceManifest {
        name: org.manifest.org.clone(),
        owner: MarketplaceOwner {
            name: org.manifest.org.clone(),
        },
        plugins,
    })
}

/// Serialize a descriptor the one way it is ever written: two-space indented
/// JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// POSIX relative path from the brand repo root to a skill directory.
#[must_use]
pub fn plugin_source(skills_dir: &str, skill_name: &str) -> String {
    let mut parts: Vec<&str> = skills_dir
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    parts.push(skill_name);
    format!("./{}", parts.join("/"))
}

fn read_frontmatter(skill: &Skill) -> Result<Frontmatter> {
    Frontmatter::parse_path(&skill.skill_md())
        .map_err(|err| ChaparralError::InvalidSkill(format!("reading {}: {err}", skill.name)))
}
