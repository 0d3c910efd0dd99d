//! File system utilities for artifact correction.
//!
//! Every corrective write goes through a sibling temporary file that is
//! persisted over the original, so a crash never leaves a half-written file
//! in place.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    io::{self, Write},
    path::Path,
};

/// Replaces `path` with `contents` via a sibling temporary file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".jfx-correct")
        .tempfile_in(dir)
        .fs_context("creating temporary file beside", path)?;
    temp.write_all(contents)
        .fs_context("writing temporary file for", path)?;
    temp.as_file()
        .sync_all()
        .fs_context("syncing temporary file for", path)?;

    // Keep the original permissions on the replacement
    if let Ok(metadata) = std::fs::metadata(path) {
        std::fs::set_permissions(temp.path(), metadata.permissions())
            .fs_context("copying permissions for", path)?;
    }

    temp.persist(path).map_err(|e| Error::Fs {
        context: "replacing",
        path: path.to_path_buf(),
        error: e.error,
    })?;
    Ok(())
}

/// Renames `from` to `to` in one step, replacing any existing `to`.
pub fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
    std::fs::rename(from, to).fs_context("renaming", from)
}

/// Removes a file, treating a missing file as success.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false), // Idempotent
        Err(e) => Err(e).fs_context("removing", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_contents_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.jnlp");
        std::fs::write(&file, b"old").unwrap();

        write_atomic(&file, b"new contents").unwrap();

        assert_eq!(std::fs::read(&file).unwrap(), b"new contents");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rename_replaces_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("My.App.cfg");
        let b = dir.path().join("My.cfg");
        std::fs::write(&a, b"fresh").unwrap();
        std::fs::write(&b, b"stale").unwrap();

        rename_replacing(&a, &b).unwrap();
        assert_eq!(std::fs::read(&b).unwrap(), b"fresh");
        assert!(!a.exists());
    }

    #[test]
    fn rename_onto_directory_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("My.App.cfg");
        let b = dir.path().join("My.cfg");
        std::fs::write(&a, b"fresh").unwrap();
        std::fs::create_dir_all(b.join("nested")).unwrap();

        let err = rename_replacing(&a, &b).unwrap_err();
        assert!(err.to_string().contains("My.App.cfg"));
        assert!(a.exists());
    }

    #[test]
    fn remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove_file_if_exists(&dir.path().join("none.html")).unwrap());
    }
}
