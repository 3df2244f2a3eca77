//! Symlink reconciliation
//!
//! Converges an organization toward its desired link topology:
//!
//! - `<org>/CLAUDE.md` -> the brand repo's shared instruction file
//! - `<org>/<repo>/.claude/skills/<skill>` -> the skill directory in the brand repo
//!
//! Only symlinks are ever created, replaced, or removed. Anything else found at
//! a destination is reported and left alone.
//!
//! Every operation is a read-then-act sequence on the filesystem with no
//! locking. A single writer per organization is assumed; a concurrent edit
//! between the inspection and the mutation of a destination can make the
//! reported result inaccurate.

mod symlink;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::discovery::find_skills;
use crate::core::org::{CLAUDE_MD, LINK_DIR, ORG_LABEL, Organization};
use crate::error::Result;
use crate::utils::fs::ensure_dir;

use symlink::{Inspection, create_symlink, inspect, remove_symlink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAction {
    Created,
    Exists,
    Skipped,
    Error,
    Removed,
}

impl LinkAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Exists => "exists",
            Self::Skipped => "skipped",
            Self::Error => "error",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for LinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one attempted link operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    pub repo: String,
    /// Skill name, or `CLAUDE.md` for the organization-level link.
    pub skill: String,
    pub action: LinkAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LinkResult {
    fn new(repo: &str, skill: &str, action: LinkAction, detail: Option<String>) -> Self {
        Self {
            repo: repo.to_string(),
            skill: skill.to_string(),
            action,
            detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Linked,
    Stale,
    Missing,
    Conflict,
}

impl LinkState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::Stale => "stale",
            Self::Missing => "missing",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one read-only inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub repo: String,
    pub skill: String,
    pub state: LinkState,
    /// Recorded symlink target, for `linked` and `stale` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
}

/// Link the shared instruction file and every skill into every sibling repo.
pub fn sync(org: &Organization) -> Result<Vec<LinkResult>> {
    let mut results = vec![link_claude_md(org)];

    let skills = find_skills(&org.skills_path())?;

    for repo in &org.repos {
        for skill in &skills {
            let link_dir = org.repo_link_dir(repo);
            let result = match ensure_dir(&link_dir) {
                Ok(()) => converge(&skill.path, &link_dir.join(&skill.name), repo, &skill.name),
                Err(err) => LinkResult::new(
                    repo,
                    &skill.name,
                    LinkAction::Error,
                    Some(format!("creating {LINK_DIR}: {err}")),
                ),
            };
            results.push(result);
        }
    }

    log_results(org, &results);
    Ok(results)
}

/// Classify every expected link without touching the filesystem.
pub fn status(org: &Organization) -> Result<Vec<LinkStatus>> {
    let mut statuses = vec![check_link(
        &org.claude_md_link(),
        &org.claude_md_path(),
        ORG_LABEL,
        CLAUDE_MD,
    )];

    let skills = find_skills(&org.skills_path())?;

    for repo in &org.repos {
        for skill in &skills {
            let dest = org.repo_link_dir(repo).join(&skill.name);
            statuses.push(check_link(&dest, &skill.path, repo, &skill.name));
        }
    }

    Ok(statuses)
}

/// Remove every managed symlink.
///
/// The destinations are owned by this tool: a symlink found at one is removed
/// even when it points somewhere other than the expected source. That case is
/// noted in the result detail. Non-symlinks are never touched.
pub fn unlink(org: &Organization) -> Result<Vec<LinkResult>> {
    let mut results = Vec::new();

    if let Some(result) = remove_link(
        &org.claude_md_link(),
        &org.claude_md_path(),
        ORG_LABEL,
        CLAUDE_MD,
    ) {
        results.push(result);
    }

    let skills = find_skills(&org.skills_path())?;

    for repo in &org.repos {
        for skill in &skills {
            let dest = org.repo_link_dir(repo).join(&skill.name);
            if let Some(result) = remove_link(&dest, &skill.path, repo, &skill.name) {
                results.push(result);
            }
        }
    }

    info!(org = %org.name, removed = count(&results, LinkAction::Removed), "unlink finished");
    Ok(results)
}

/// Count results carrying `action`.
#[must_use]
pub fn count(results: &[LinkResult], action: LinkAction) -> usize {
    results.iter().filter(|r| r.action == action).count()
}

fn link_claude_md(org: &Organization) -> LinkResult {
    let source = org.claude_md_path();
    if !source.exists() {
        return LinkResult::new(
            ORG_LABEL,
            CLAUDE_MD,
            LinkAction::Skipped,
            Some("source not found".to_string()),
        );
    }
    converge(&source, &org.claude_md_link(), ORG_LABEL, CLAUDE_MD)
}

fn converge(source: &Path, dest: &Path, repo: &str, name: &str) -> LinkResult {
    match inspect(dest) {
        Inspection::Symlink(target) if target == source => {
            return LinkResult::new(repo, name, LinkAction::Exists, None);
        }
        Inspection::Symlink(target) => {
            debug!(dest = %dest.display(), old = %target.display(), "replacing stale link");
            if let Err(err) = remove_symlink(dest) {
                return LinkResult::new(repo, name, LinkAction::Error, Some(err.to_string()));
            }
        }
        Inspection::Other => {
            return LinkResult::new(
                repo,
                name,
                LinkAction::Skipped,
                Some("non-symlink file exists at destination".to_string()),
            );
        }
        Inspection::Absent | Inspection::Unreadable => {}
    }

    match create_symlink(source, dest) {
        Ok(()) => {
            debug!(dest = %dest.display(), source = %source.display(), "created link");
            LinkResult::new(repo, name, LinkAction::Created, None)
        }
        Err(err) => LinkResult::new(repo, name, LinkAction::Error, Some(err.to_string())),
    }
}

fn check_link(dest: &Path, expected: &Path, repo: &str, name: &str) -> LinkStatus {
    let (state, target) = match inspect(dest) {
        Inspection::Absent | Inspection::Unreadable => (LinkState::Missing, None),
        Inspection::Other => (LinkState::Conflict, None),
        Inspection::Symlink(target) if target == expected => (LinkState::Linked, Some(target)),
        Inspection::Symlink(target) => (LinkState::Stale, Some(target)),
    };
    LinkStatus {
        repo: repo.to_string(),
        skill: name.to_string(),
        state,
        target,
    }
}

fn remove_link(dest: &Path, expected: &Path, repo: &str, name: &str) -> Option<LinkResult> {
    let Inspection::Symlink(target) = inspect(dest) else {
        return None;
    };

    let detail = (target != expected).then(|| {
        warn!(
            dest = %dest.display(),
            target = %target.display(),
            expected = %expected.display(),
            "removing symlink that points at an unexpected target"
        );
        format!("pointed at {}", target.display())
    });

    Some(match remove_symlink(dest) {
        Ok(()) => LinkResult::new(repo, name, LinkAction::Removed, detail),
        Err(err) => LinkResult::new(repo, name, LinkAction::Error, Some(err.to_string())),
    })
}

fn log_results(org: &Organization, results: &[LinkResult]) {
    for result in results {
        match result.action {
            LinkAction::Skipped | LinkAction::Error => warn!(
                repo = %result.repo,
                skill = %result.skill,
                action = %result.action,
                detail = result.detail.as_deref().unwrap_or_default(),
                "link not applied"
            ),
            LinkAction::Created | LinkAction::Exists | LinkAction::Removed => {}
        }
    }
    info!(
        org = %org.name,
        created = count(results, LinkAction::Created),
        exists = count(results, LinkAction::Exists),
        "sync finished"
    );
}
