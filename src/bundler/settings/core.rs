//! Core Settings struct and implementations.

use super::{BundleSettings, PackageSettings, SigningSettings};
use crate::bundler::corrector::CorrectionToggles;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where to find the packaging toolchain and the JVM that runs it.
///
/// Both default to detection from `JAVA_HOME` and `PATH`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainSettings {
    /// Toolchain archive (`ant-javafx.jar`).
    #[serde(default)]
    pub archive: Option<PathBuf>,

    /// `java` executable.
    #[serde(default)]
    pub java: Option<PathBuf>,
}

/// Main settings for a packaging session.
///
/// Central configuration for the session, loaded from `jfx-bundle.toml` or
/// constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_jfx::bundler::{SettingsBuilder, PackageSettings, BundleSettings};
///
/// # fn example() -> kodegen_bundler_jfx::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .package_settings(PackageSettings {
///         classes_dir: "target/classes".into(),
///         main_class: "com.example.App".into(),
///         output_jar: "target/jfx/app/app.jar".into(),
///         ..Default::default()
///     })
///     .bundle_settings(BundleSettings {
///         output_dir: "target/jfx/native".into(),
///         app_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// Toolchain location.
    #[serde(default)]
    toolchain: ToolchainSettings,

    /// Jar packaging request.
    package: PackageSettings,

    /// Signing request; jars are left unsigned when absent.
    #[serde(default)]
    signing: Option<SigningSettings>,

    /// Bundling request.
    bundle: BundleSettings,

    /// Corrective pass toggles.
    #[serde(default)]
    corrections: CorrectionToggles,

    /// Ask the toolchain for verbose output.
    #[serde(default)]
    verbose: bool,
}

impl Settings {
    /// Returns the toolchain location settings.
    pub fn toolchain(&self) -> &ToolchainSettings {
        &self.toolchain
    }

    /// Mutable toolchain settings, for command-line overrides.
    pub fn toolchain_mut(&mut self) -> &mut ToolchainSettings {
        &mut self.toolchain
    }

    /// Returns the packaging request.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Returns the signing request, if any.
    pub fn signing(&self) -> Option<&SigningSettings> {
        self.signing.as_ref()
    }

    /// Mutable signing request, for command-line password overrides.
    pub fn signing_mut(&mut self) -> Option<&mut SigningSettings> {
        self.signing.as_mut()
    }

    /// Returns the bundling request.
    pub fn bundle(&self) -> &BundleSettings {
        &self.bundle
    }

    /// Mutable bundling request, for command-line overrides.
    pub fn bundle_mut(&mut self) -> &mut BundleSettings {
        &mut self.bundle
    }

    /// Returns the corrective pass toggles.
    pub fn corrections(&self) -> &CorrectionToggles {
        &self.corrections
    }

    /// Whether the toolchain runs verbosely.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Sets toolchain verbosity.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Resolves relative paths against `base`, the configuration file's directory.
    pub fn rebase_paths(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(archive) = self.toolchain.archive.as_mut() {
            rebase(archive);
        }
        rebase(&mut self.package.classes_dir);
        rebase(&mut self.package.output_jar);
        if let Some(dir) = self.package.dependencies_dir.as_mut() {
            rebase(dir);
        }
        if let Some(signing) = self.signing.as_mut() {
            rebase(&mut signing.keystore);
        }
        rebase(&mut self.bundle.output_dir);
        if let Some(runtime) = self.bundle.runtime.as_mut() {
            rebase(runtime);
        }
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        toolchain: ToolchainSettings,
        package: PackageSettings,
        signing: Option<SigningSettings>,
        bundle: BundleSettings,
        corrections: CorrectionToggles,
        verbose: bool,
    ) -> Self {
        Self {
            toolchain,
            package,
            signing,
            bundle,
            corrections,
            verbose,
        }
    }
}
