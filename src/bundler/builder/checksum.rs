//! Artifact checksum calculation.
//!
//! SHA-256 for bundled artifacts, supporting both single files (installers,
//! descriptors) and directory trees (application images).

use crate::{
    bail,
    bundler::{Result, error::ErrorExt},
};
use sha2::{Digest, Sha256};
use std::{fs::File, io::Read, path::Path};

/// Calculates the SHA-256 of a file or directory, hex encoded.
///
/// Directories hash every file's relative path and content in sorted order,
/// so the result does not depend on traversal order.
pub fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path).fs_context("reading metadata of", path)?;

    if metadata.is_file() {
        let mut hasher = Sha256::new();
        hash_file(path, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    } else if metadata.is_dir() {
        calculate_directory_sha256(path)
    } else {
        bail!("Path is neither file nor directory: {}", path.display())
    }
}

/// Total byte size of a file or of every file under a directory.
pub fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).fs_context("reading artifact metadata", path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let mut total = 0;
    for entry in walkdir::WalkDir::new(path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir_path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    // Sort by path for deterministic ordering
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut hasher = Sha256::new();
    for entry in entries {
        // Include relative path in hash (preserves directory structure)
        if let Ok(rel_path) = entry.path().strip_prefix(dir_path) {
            hasher.update(rel_path.to_string_lossy().replace('\\', "/").as_bytes());
        }
        hash_file(entry.path(), &mut hasher)?;
    }

    Ok(hex::encode(hasher.finalize()))
}

fn hash_file(path: &Path, hasher: &mut Sha256) -> Result<()> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    let mut buffer = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buffer)
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(())
}
