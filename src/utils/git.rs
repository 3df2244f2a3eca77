//! Git utilities

use std::path::Path;

/// Check if directory is a git repository (has a `.git` directory).
pub fn is_repo(path: impl AsRef<Path>) -> bool {
    path.as_ref().join(".git").is_dir()
}
