//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chaparral::core::discovery::{find_skills, load_org};
use chaparral::core::org::{Organization, Skill};
use tempfile::TempDir;

/// An organization directory under a temporary base:
///
/// ```text
/// <base>/<org>/brand/chaparral.json
/// <base>/<org>/brand/CLAUDE.md
/// <base>/<org>/brand/skills/...
/// <base>/<org>/<repo>/.git
/// ```
pub struct OrgFixture {
    pub temp_dir: TempDir,
    pub base: PathBuf,
    pub org_path: PathBuf,
}

impl OrgFixture {
    pub fn new(org: &str) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let base = temp_dir.path().to_path_buf();
        let org_path = base.join(org);
        let brand = org_path.join("brand");
        fs::create_dir_all(brand.join("skills")).expect("create brand repo");
        git2::Repository::init(&brand).expect("init brand repo");
        fs::write(
            brand.join("chaparral.json"),
            format!(r#"{{"org": "{org}", "claude_md": "CLAUDE.md", "skills_dir": "skills"}}"#),
        )
        .expect("write manifest");
        fs::write(brand.join("CLAUDE.md"), "# Shared instructions\n").expect("write CLAUDE.md");

        Self {
            temp_dir,
            base,
            org_path,
        }
    }

    pub fn brand(&self) -> PathBuf {
        self.org_path.join("brand")
    }

    /// Create a sibling repository (a directory with a `.git` dir).
    pub fn add_repo(&self, name: &str) -> PathBuf {
        let path = self.org_path.join(name);
        fs::create_dir_all(path.join(".git")).expect("create repo");
        path
    }

    pub fn add_skill(&self, name: &str, description: &str) -> PathBuf {
        self.add_skill_raw(
            name,
            &format!("---\nname: {name}\ndescription: \"{description}\"\n---\n\n# {name}\n"),
        )
    }

    pub fn add_skill_raw(&self, name: &str, skill_md: &str) -> PathBuf {
        let path = self.brand().join("skills").join(name);
        fs::create_dir_all(&path).expect("create skill dir");
        fs::write(path.join("SKILL.md"), skill_md).expect("write SKILL.md");
        path
    }

    pub fn org(&self) -> Organization {
        load_org(&self.org_path)
            .expect("load org")
            .expect("org has a brand repo")
    }

    pub fn skills(&self) -> Vec<Skill> {
        find_skills(&self.org().skills_path()).expect("find skills")
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        fs::read_to_string(self.org_path.join(relative)).expect("read file")
    }

    pub fn read_json(&self, relative: impl AsRef<Path>) -> serde_json::Value {
        serde_json::from_str(&self.read(relative)).expect("parse json")
    }
}
