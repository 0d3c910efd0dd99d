//! Fresh views of the artifact tree on disk.
//!
//! Nothing here is cached across passes: a pass may rename or rewrite files,
//! so the next pass scans again.

use crate::bundler::error::Result;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Regular files under a root directory at the time of scanning.
#[derive(Debug, Clone)]
pub struct ArtifactTree {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ArtifactTree {
    /// Scans `root` recursively. Symlinks are not followed.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Files whose extension equals `ext`, ignoring ASCII case.
    pub fn files_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a Path> + 'a {
        self.files
            .iter()
            .filter(move |p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
            })
            .map(PathBuf::as_path)
    }

    /// Stats every file now. Unreadable entries are left out.
    pub fn size_index(&self) -> FileSizeIndex {
        let sizes = self
            .files
            .iter()
            .filter_map(|path| {
                let relative = path.strip_prefix(&self.root).ok()?.to_path_buf();
                let len = std::fs::metadata(path).ok()?.len();
                Some((relative, len))
            })
            .collect();
        FileSizeIndex { sizes }
    }
}

/// Current byte length of each file, keyed by path relative to the tree root.
#[derive(Debug, Clone, Default)]
pub struct FileSizeIndex {
    sizes: BTreeMap<PathBuf, u64>,
}

impl FileSizeIndex {
    pub fn size_of(&self, relative: &Path) -> Option<u64> {
        self.sizes.get(relative).copied()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }
}

/// Turns a descriptor `href` into a path relative to the tree root.
///
/// Both separators are accepted. Returns `None` for URLs, absolute paths and
/// references that climb out of the root.
pub fn resolve_href(href: &str) -> Option<PathBuf> {
    let href = href.split(['?', '#']).next().unwrap_or_default();
    if href.is_empty() || href.contains("://") || href.starts_with(['/', '\\']) {
        return None;
    }
    // Drive-letter paths such as C:\
    if href.as_bytes().get(1) == Some(&b':') {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in href.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.into_iter().collect())
}
