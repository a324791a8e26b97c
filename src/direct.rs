//! Conventional filesystem backend.
//!
//! Free functions over `std::fs`, called by the facade's
//! [`Location::Direct`](crate::Location::Direct) arms. Errors carry the
//! `file://` form of the path.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::{FILE_PREFIX, OpenMode, StorageError};

fn display(path: &Path) -> String {
    format!("{FILE_PREFIX}{}", path.display())
}

pub(crate) fn exists(path: &Path) -> bool {
    path.exists()
}

pub(crate) fn last_modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Remove a file or an empty directory.
///
/// Returns `Ok(false)` when the filesystem refuses for reasons other than
/// absence or permissions (e.g. a non-empty directory).
pub(crate) fn delete(path: &Path) -> Result<bool, StorageError> {
    let meta = fs::symlink_metadata(path).map_err(|e| StorageError::io("delete", display(path), e))?;
    let result = if meta.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
            Err(StorageError::io("delete", display(path), e))
        }
        Err(e) => {
            debug!("delete refused for {}: {e}", path.display());
            Ok(false)
        }
    }
}

pub(crate) fn existing_child(dir: &Path, relative: &str) -> Option<PathBuf> {
    let child = dir.join(relative);
    child.exists().then_some(child)
}

pub(crate) fn create_file(dir: &Path, name: &str, replace: bool) -> Result<PathBuf, StorageError> {
    let path = dir.join(name);
    if path.exists() {
        if !replace {
            return Ok(path);
        }
        fs::remove_file(&path).map_err(|e| StorageError::io("create_file", display(&path), e))?;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| StorageError::io("create_file", display(&path), e))?;
    Ok(path)
}

pub(crate) fn open(path: &Path, mode: OpenMode) -> Result<File, StorageError> {
    let mut options = OpenOptions::new();
    options.read(true);
    match mode {
        OpenMode::Read => {}
        OpenMode::ReadWrite => {
            options.write(true).create(true);
        }
        OpenMode::ReadWriteTruncate => {
            options.write(true).create(true).truncate(true);
        }
    }
    options
        .open(path)
        .map_err(|e| StorageError::io("open", display(path), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn create_file_keeps_existing_without_replace() {
        let tmp = tempfile::tempdir().unwrap();
        let path = create_file(tmp.path(), "a.txt", false).unwrap();
        fs::write(&path, b"keep").unwrap();

        let again = create_file(tmp.path(), "a.txt", false).unwrap();
        assert_eq!(again, path);
        assert_eq!(fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn create_file_replace_truncates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = create_file(tmp.path(), "a.txt", false).unwrap();
        fs::write(&path, b"old").unwrap();

        create_file(tmp.path(), "a.txt", true).unwrap();
        assert!(fs::read(&path).unwrap().is_empty());
    }

    #[test]
    fn create_file_in_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = create_file(&tmp.path().join("nope"), "a.txt", false).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = delete(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn delete_non_empty_dir_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f"), b"x").unwrap();
        assert!(!delete(&dir).unwrap());
        assert!(dir.exists());
    }

    #[test]
    fn open_modes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, b"0123456789").unwrap();

        let mut f = open(&path, OpenMode::ReadWrite).unwrap();
        f.write_all(b"ab").unwrap();
        drop(f);
        assert_eq!(fs::read(&path).unwrap(), b"ab23456789");

        let mut f = open(&path, OpenMode::ReadWriteTruncate).unwrap();
        f.write_all(b"z").unwrap();
        drop(f);

        let mut out = String::new();
        open(&path, OpenMode::Read)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "z");
    }

    #[test]
    fn existing_child_only_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(existing_child(tmp.path(), "x"), None);
        fs::write(tmp.path().join("x"), b"").unwrap();
        assert_eq!(existing_child(tmp.path(), "x"), Some(tmp.path().join("x")));
    }
}
