//! Skill validation

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ChaparralError, Result};

use super::discovery::find_skills;
use super::frontmatter::Frontmatter;
use super::org::{Organization, Skill};

static KEBAB_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("kebab-case pattern is valid")
});

/// Errors and warnings for a single skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub skill: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// No blocking errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a single skill for structure and metadata issues.
#[must_use]
pub fn validate_skill(skill: &Skill) -> ValidationResult {
    let mut result = ValidationResult {
        skill: skill.name.clone(),
        ..ValidationResult::default()
    };

    let skill_md = skill.skill_md();
    if !skill_md.exists() {
        result.errors.push("missing SKILL.md".to_string());
        return result;
    }

    let fm = match Frontmatter::parse_path(&skill_md) {
        Ok(fm) => fm,
        Err(err) => {
            result.errors.push(format!("can't parse frontmatter: {err}"));
            return result;
        }
    };

    if fm.name.is_empty() {
        result.errors.push("missing required field: name".to_string());
    }
    if fm.description.is_empty() {
        result
            .errors
            .push("missing required field: description".to_string());
    }

    if !fm.name.is_empty() {
        if !KEBAB_CASE.is_match(&fm.name) {
            result.errors.push(format!(
                "name {:?} must be lowercase kebab-case (e.g., my-skill)",
                fm.name
            ));
        }
        if fm.name != skill.name {
            result.warnings.push(format!(
                "frontmatter name {:?} differs from directory name {:?}",
                fm.name, skill.name
            ));
        }
    }

    if fm.license.is_empty() {
        result.warnings.push("no license specified".to_string());
    }

    result
}

/// Validate every skill in an organization.
pub fn validate_org(org: &Organization) -> Result<Vec<ValidationResult>> {
    let skills = find_skills(&org.skills_path()).map_err(|err| {
        ChaparralError::ValidationFailed(format!("finding skills in {}: {err}", org.name))
    })?;
    Ok(skills.iter().map(validate_skill).collect())
}
