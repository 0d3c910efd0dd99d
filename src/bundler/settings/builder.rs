//! Builder for constructing Settings.

use super::{BundleSettings, PackageSettings, Settings, SigningSettings, ToolchainSettings};
use crate::bundler::corrector::CorrectionToggles;
use std::path::Path;

/// Builder for constructing [`Settings`].
///
/// Provides a fluent API for building session settings with validation.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_jfx::bundler::{SettingsBuilder, PackageSettings, BundleSettings, BundleType};
///
/// # fn example() -> kodegen_bundler_jfx::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .toolchain_archive("/usr/lib/jvm/java-8-oracle/lib/ant-javafx.jar")
///     .package_settings(PackageSettings {
///         classes_dir: "target/classes".into(),
///         main_class: "com.example.App".into(),
///         output_jar: "target/jfx/app/app.jar".into(),
///         ..Default::default()
///     })
///     .bundle_settings(BundleSettings {
///         output_dir: "target/jfx/native".into(),
///         types: vec![BundleType::Image],
///         app_name: "My.App".into(),
///         version: "1.0.0".into(),
///         embed_runtime: true,
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    toolchain: ToolchainSettings,
    package: Option<PackageSettings>,
    signing: Option<SigningSettings>,
    bundle: Option<BundleSettings>,
    corrections: CorrectionToggles,
    verbose: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the toolchain archive.
    ///
    /// Default: detected from `JAVA_HOME`
    pub fn toolchain_archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.toolchain.archive = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the `java` executable.
    ///
    /// Default: detected from `JAVA_HOME` or `PATH`
    pub fn java<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.toolchain.java = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the packaging request.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package = Some(settings);
        self
    }

    /// Sets the signing request.
    ///
    /// Default: None (jars stay unsigned)
    pub fn signing_settings(mut self, settings: SigningSettings) -> Self {
        self.signing = Some(settings);
        self
    }

    /// Sets the bundling request.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle = Some(settings);
        self
    }

    /// Sets corrective pass toggles.
    ///
    /// Default: every pass enabled
    pub fn corrections(mut self, toggles: CorrectionToggles) -> Self {
        self.corrections = toggles;
        self
    }

    /// Asks the toolchain for verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing:
    /// - `package_settings`
    /// - `bundle_settings`
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        Ok(Settings::new(
            self.toolchain,
            self.package.context("package_settings is required")?,
            self.signing,
            self.bundle.context("bundle_settings is required")?,
            self.corrections,
            self.verbose,
        ))
    }
}
