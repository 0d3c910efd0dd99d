//! Toolchain and JVM discovery.
//!
//! The packager archive ships inside the SDK, never on its own, so it is
//! looked up relative to `JAVA_HOME` (or the `java` found on `PATH`). An
//! explicit location from configuration always wins.

use crate::bundler::{BindingError, binder::TOOLCHAIN_LAYOUT};
use std::path::{Path, PathBuf};

/// File name of the packager archive.
pub const TOOLCHAIN_ARCHIVE: &str = "ant-javafx.jar";

#[cfg(windows)]
const JAVA_EXECUTABLE: &str = "java.exe";
#[cfg(not(windows))]
const JAVA_EXECUTABLE: &str = "java";

/// Finds the packager archive.
///
/// # Errors
///
/// [`BindingError::ToolchainNotFound`] naming the expected layout when no
/// candidate exists.
pub fn locate_toolchain(explicit: Option<&Path>) -> Result<PathBuf, BindingError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let java_home = std::env::var_os("JAVA_HOME")
        .map(PathBuf::from)
        .or_else(java_home_from_path);
    locate_toolchain_in(java_home.as_deref())
}

/// Searches `<home>/lib` then `<home>/../lib`.
pub fn locate_toolchain_in(java_home: Option<&Path>) -> Result<PathBuf, BindingError> {
    let Some(home) = java_home else {
        return Err(BindingError::ToolchainNotFound {
            location: PathBuf::from(TOOLCHAIN_ARCHIVE),
            expected_layout: TOOLCHAIN_LAYOUT.to_string(),
            reason: "JAVA_HOME is not set and no java executable was found on PATH".into(),
        });
    };

    let candidates = toolchain_candidates(home);
    if let Some(found) = candidates.iter().find(|c| c.is_file()) {
        log::debug!("Found packaging toolchain at {}", found.display());
        return Ok(found.clone());
    }

    Err(BindingError::ToolchainNotFound {
        location: candidates[0].clone(),
        expected_layout: TOOLCHAIN_LAYOUT.to_string(),
        reason: format!("no {TOOLCHAIN_ARCHIVE} under {}", home.display()),
    })
}

fn toolchain_candidates(home: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![home.join("lib").join(TOOLCHAIN_ARCHIVE)];
    if let Some(parent) = home.parent() {
        candidates.push(parent.join("lib").join(TOOLCHAIN_ARCHIVE));
    }
    candidates
}

/// `JAVA_HOME` implied by the `java` executable on `PATH`.
fn java_home_from_path() -> Option<PathBuf> {
    let java = which::which("java").ok()?;
    // Follow /usr/bin/java style alternatives links into the real install
    let java = std::fs::canonicalize(&java).unwrap_or(java);
    Some(java.parent()?.parent()?.to_path_buf())
}

/// Finds the `java` executable used to run the toolchain.
///
/// Tries the explicit path, `JAVA_HOME/bin`, the SDK that holds `toolchain`,
/// then `PATH`.
pub fn locate_java(explicit: Option<&Path>, toolchain: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let from_env = std::env::var_os("JAVA_HOME")
        .map(|home| PathBuf::from(home).join("bin").join(JAVA_EXECUTABLE));
    // <sdk>/lib/ant-javafx.jar -> <sdk>/bin/java
    let from_toolchain = toolchain
        .parent()
        .and_then(Path::parent)
        .map(|sdk| sdk.join("bin").join(JAVA_EXECUTABLE));

    if let Some(found) = from_env.into_iter().chain(from_toolchain).find(|p| p.is_file()) {
        return Some(found);
    }

    match which::which("java") {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("java not found in PATH: {e}");
            None
        }
    }
}
