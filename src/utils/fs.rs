//! Filesystem utilities.
//!
//! Helper functions for file operations.

use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Read a file's raw bytes, returning None if it doesn't exist.
pub fn read_optional_bytes(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path.as_ref()) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Modification time of `path`, or None if it doesn't exist.
pub fn modified_optional(path: impl AsRef<Path>) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path.as_ref()) {
        Ok(meta) => Ok(Some(meta.modified()?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Whether anything, including a dangling symlink, exists at `path`.
pub fn exists_no_follow(path: impl AsRef<Path>) -> bool {
    std::fs::symlink_metadata(path.as_ref()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_optional_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(dir.path().join("nope")).unwrap().is_none());
        std::fs::write(dir.path().join("yes"), "hi").unwrap();
        assert_eq!(read_optional(dir.path().join("yes")).unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn read_optional_bytes_keeps_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional_bytes(dir.path().join("nope")).unwrap().is_none());
        std::fs::write(dir.path().join("bin"), [0xff, 0xfe, b'{']).unwrap();
        assert_eq!(
            read_optional_bytes(dir.path().join("bin")).unwrap(),
            Some(vec![0xff, 0xfe, b'{'])
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn modified_optional_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(modified_optional(dir.path().join("nope")).unwrap().is_none());
        assert!(modified_optional(dir.path()).unwrap().is_some());
    }
}
