//! Jar packaging request.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to package into the application jar.
///
/// # Configuration
///
/// ```toml
/// [package]
/// classes_dir = "target/classes"
/// dependencies_dir = "target/jfx/app/lib"
/// main_class = "com.example.App"
/// output_jar = "target/jfx/app/app.jar"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSettings {
    /// Compiled classes and resources.
    pub classes_dir: PathBuf,

    /// Directory of dependency jars.
    ///
    /// Omitted from the jar's classpath when it does not exist.
    ///
    /// Default: `lib/` next to the output jar
    #[serde(default)]
    pub dependencies_dir: Option<PathBuf>,

    /// Fully qualified application class.
    pub main_class: String,

    /// Jar file to write.
    pub output_jar: PathBuf,
}

impl PackageSettings {
    /// Dependency directory, defaulting to `lib/` beside the output jar.
    pub fn dependencies_dir(&self) -> PathBuf {
        match &self.dependencies_dir {
            Some(dir) => dir.clone(),
            None => self.jar_dir().join("lib"),
        }
    }

    /// Directory the output jar is written to.
    pub fn jar_dir(&self) -> &Path {
        self.output_jar.parent().unwrap_or_else(|| Path::new("."))
    }
}
