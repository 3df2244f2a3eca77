//! Platform symlink primitives. Nothing here resolves through a link.

use std::io;
use std::path::{Path, PathBuf};

/// What `lstat` + `readlink` observe at a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Inspection {
    Absent,
    /// Something is there but its metadata or link target can't be read.
    Unreadable,
    /// A symlink, with its recorded (unresolved) target.
    Symlink(PathBuf),
    /// A regular file, directory, or anything else that isn't a symlink.
    Other,
}

pub(super) fn inspect(path: &Path) -> Inspection {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match std::fs::read_link(path) {
            Ok(target) => Inspection::Symlink(target),
            Err(_) => Inspection::Unreadable,
        },
        Ok(_) => Inspection::Other,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Inspection::Absent,
        Err(_) => Inspection::Unreadable,
    }
}

#[cfg(unix)]
pub(super) fn create_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(windows)]
pub(super) fn create_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, dest)
    } else {
        std::os::windows::fs::symlink_file(source, dest)
    }
}

#[cfg(unix)]
pub(super) fn remove_symlink(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

#[cfg(windows)]
pub(super) fn remove_symlink(path: &Path) -> io::Result<()> {
    // Directory symlinks are removed with remove_dir on Windows.
    std::fs::remove_file(path).or_else(|_| std::fs::remove_dir(path))
}
