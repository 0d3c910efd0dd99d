//! JVM process launch.
//!
//! Bound entry points are reached by starting a JVM with the toolchain archive
//! on the classpath. The [`Launcher`] trait is the seam between the binder and
//! the operating system.

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::Command,
};

/// One JVM launch.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Archive placed on the classpath
    pub classpath: PathBuf,
    /// Fully qualified main class
    pub main_class: String,
    /// Program arguments
    pub args: Vec<OsString>,
}

impl LaunchRequest {
    /// Arguments as lossy UTF-8 strings, for diagnostics.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Captured result of a launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchOutput {
    /// Exit code, `None` when terminated by a signal
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl LaunchOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Last non-empty stderr line, falling back to stdout.
    pub fn last_diagnostic(&self) -> Option<&str> {
        self.stderr
            .lines()
            .rfind(|l| !l.trim().is_empty())
            .or_else(|| self.stdout.lines().rfind(|l| !l.trim().is_empty()))
            .map(str::trim)
    }
}

/// Starts JVM processes on behalf of the binder.
pub trait Launcher {
    /// Runs the request to completion and captures its output.
    fn launch(&self, request: &LaunchRequest) -> io::Result<LaunchOutput>;
}

/// Launches the `java` executable.
#[derive(Debug, Clone)]
pub struct JavaLauncher {
    java: PathBuf,
}

impl JavaLauncher {
    /// Uses the given `java` executable.
    pub fn new(java: impl Into<PathBuf>) -> Self {
        Self { java: java.into() }
    }

    /// Path of the `java` executable.
    pub fn java(&self) -> &Path {
        &self.java
    }
}

impl Launcher for JavaLauncher {
    fn launch(&self, request: &LaunchRequest) -> io::Result<LaunchOutput> {
        log::debug!(
            "Launching {} -cp {} {} ({} args)",
            self.java.display(),
            request.classpath.display(),
            request.main_class,
            request.args.len()
        );

        let output = Command::new(&self.java)
            .arg("-cp")
            .arg(&request.classpath)
            .arg(&request.main_class)
            .args(&request.args)
            .output()?;

        Ok(LaunchOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
