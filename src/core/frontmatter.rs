//! SKILL.md frontmatter
//!
//! Only the flat `key: value` block between the leading `---` delimiters is
//! read. Nested YAML is not interpreted.

use std::path::Path;

use serde::Serialize;

use crate::error::{ChaparralError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub name: String,
    pub description: String,
    /// Empty when the skill declares no license.
    pub license: String,
}

impl Frontmatter {
    pub fn parse_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            ChaparralError::InvalidSkill(format!("can't open {}: {err}", path.display()))
        })?;
        Self::parse_str(&content, path)
    }

    /// Parse frontmatter from `content`. `source` is only used in messages.
    pub fn parse_str(content: &str, source: &Path) -> Result<Self> {
        let mut lines = content.lines();
        if lines.next().map(str::trim) != Some("---") {
            return Err(ChaparralError::InvalidSkill(format!(
                "SKILL.md at {} has no frontmatter (missing opening ---)",
                source.display()
            )));
        }

        let mut fm = Self::default();
        for line in lines {
            if line.trim() == "---" {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "name" => fm.name = value.to_string(),
                "description" => fm.description = value.to_string(),
                "license" => fm.license = value.to_string(),
                _ => {}
            }
        }

        Ok(fm)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
