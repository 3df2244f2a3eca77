//! Writes generated manifests to their canonical locations

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::org::{Organization, Skill};
use crate::error::{ChaparralError, Result};
use crate::utils::fs::{ensure_dir, exists_no_follow};

use super::diff::plan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// POSIX path relative to the brand repository root.
    pub path: String,
    /// The file did not exist immediately before the write.
    pub is_new: bool,
}

/// Result of writing a set of files independently of each other.
#[derive(Debug)]
pub struct WriteOutcome {
    pub written: Vec<WrittenFile>,
    /// First failure encountered, if any. Later files were still attempted.
    pub error: Option<ChaparralError>,
}

impl WriteOutcome {
    /// Collapse into a `Result`. A failure after some files were written
    /// carries their paths in [`ChaparralError::PartialWrite`].
    pub fn into_result(self) -> Result<Vec<WrittenFile>> {
        match self.error {
            None => Ok(self.written),
            Some(err) if self.written.is_empty() => Err(err),
            Some(err) => Err(ChaparralError::PartialWrite {
                written: self.written.into_iter().map(|file| file.path).collect(),
                source: Box::new(err),
            }),
        }
    }
}

/// Generate and write every plugin descriptor plus the marketplace catalog.
///
/// Generation runs to completion before anything is written, so a skill with
/// unreadable metadata leaves the disk untouched. Write failures are isolated
/// per file.
pub fn write_manifests(org: &Organization, skills: &[Skill]) -> Result<WriteOutcome> {
    let planned = plan(org, skills)?;

    let mut written = Vec::with_capacity(planned.len());
    let mut first_error = None;

    for file in planned {
        let is_new = !exists_no_follow(&file.abs_path);
        match write_file(&file.abs_path, &file.change.new_content) {
            Ok(()) => {
                debug!(path = %file.change.path, is_new, "wrote manifest");
                written.push(WrittenFile {
                    path: file.change.path,
                    is_new,
                });
            }
            Err(err) => {
                warn!(path = %file.abs_path.display(), error = %err, "failed to write manifest");
                first_error.get_or_insert(err);
            }
        }
    }

    Ok(WriteOutcome {
        written,
        error: first_error,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|err| {
        ChaparralError::Io(std::io::Error::new(
            err.kind(),
            format!("writing {}: {err}", path.display()),
        ))
    })
}
