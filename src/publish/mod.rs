//! Manifest publication pipeline
//!
//! diff -> write -> commit and push. The diff decides whether a publish is a
//! no-op; the git collaborator reports a clean tree separately from failures.

pub mod diff;
pub mod freshness;
pub mod git;
pub mod writer;

pub use diff::{ChangeKind, FileChange, diff_manifests, is_managed_plugin};
pub use freshness::{FreshnessResult, check_freshness};
pub use git::{Git2Collaborator, GitCollaborator, commit_message};
pub use writer::{WriteOutcome, WrittenFile, write_manifests};

use serde::Serialize;
use tracing::info;

use crate::core::org::{Organization, Skill};
use crate::error::{ChaparralError, Result};
use crate::manifest::INITIAL_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Every generated file already matches disk; nothing was written.
    UpToDate,
    /// Files were written but git found nothing new to commit.
    NothingToCommit {
        version: String,
        written: Vec<WrittenFile>,
    },
    Published {
        version: String,
        written: Vec<WrittenFile>,
    },
}

/// Version announced by a publish: the one carried by the first changed file.
#[must_use]
pub fn publish_version(changes: &[FileChange]) -> String {
    changes
        .iter()
        .filter(|change| change.kind != ChangeKind::Unchanged)
        .find_map(|change| {
            serde_json::from_str::<serde_json::Value>(&change.new_content)
                .ok()?
                .get("version")?
                .as_str()
                .filter(|version| !version.is_empty())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| INITIAL_VERSION.to_string())
}

/// Whether any change would alter the disk.
#[must_use]
pub fn has_changes(changes: &[FileChange]) -> bool {
    changes
        .iter()
        .any(|change| change.kind != ChangeKind::Unchanged)
}

/// Write manifests for `skills` and publish them through `git`.
pub fn publish(
    org: &Organization,
    skills: &[Skill],
    git: &dyn GitCollaborator,
) -> Result<PublishOutcome> {
    let changes = diff_manifests(org, skills)?;
    if !has_changes(&changes) {
        info!(org = %org.name, "manifests already up to date");
        return Ok(PublishOutcome::UpToDate);
    }

    let version = publish_version(&changes);
    let written = write_manifests(org, skills)?.into_result()?;
    let paths: Vec<String> = written.iter().map(|file| file.path.clone()).collect();

    match git.commit_and_push(&org.brand_repo_path(), &paths, &version) {
        Ok(()) => {
            info!(org = %org.name, %version, files = written.len(), "published marketplace");
            Ok(PublishOutcome::Published { version, written })
        }
        Err(ChaparralError::NothingToCommit) => {
            info!(org = %org.name, %version, "nothing to commit");
            Ok(PublishOutcome::NothingToCommit { version, written })
        }
        Err(err) => Err(err),
    }
}
