//! Packaging session orchestration.
//!
//! This module provides the [`Bundler`] session that takes one [`Settings`]
//! through binding, probing, packaging, signing, bundling and correction.

use crate::{
    bail,
    bundler::{
        BundledArtifact, Result, SessionContext, Settings,
        binder::{JavaLauncher, Launcher, ToolBinder},
        corrector::{ArtifactCorrector, CorrectionReport},
        facade::{BundleRequest, PackagerFacade},
        gate::{CapabilitySet, PolicyDecision, RequestOptions, VersionGate},
    },
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{
    checksum::{artifact_size, calculate_sha256},
    signing::resolve_signing,
    tool_detection::{locate_java, locate_toolchain},
};

/// What one session did, for logs and the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub app_name: String,
    /// Bound toolchain archive
    pub toolchain: PathBuf,
    /// Bundling dialect chosen for the toolchain
    pub dialect: String,
    pub capabilities: CapabilitySet,
    pub policy: PolicyDecision,
    /// Packaged application jar
    pub jar: PathBuf,
    /// Jars signed in place
    pub signed_jars: Vec<PathBuf>,
    /// One entry per requested bundle type, in request order
    pub artifacts: Vec<BundledArtifact>,
    pub corrections: CorrectionReport,
}

/// One packaging session.
///
/// Owns the session context and, once running, the bound toolchain. Bundle
/// types are processed one after another; the first failure ends the session.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_jfx::bundler::{Bundler, Settings};
///
/// # fn example(settings: Settings) -> kodegen_bundler_jfx::bundler::Result<()> {
/// let report = Bundler::new(settings).run()?;
///
/// for artifact in &report.artifacts {
///     println!("Created: {} ({} bytes)", artifact.bundle_type, artifact.size);
///     println!("SHA256: {}", artifact.checksum);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Bundler {
    settings: Settings,
    context: SessionContext,
    launcher: Option<Box<dyn Launcher>>,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .field("context", &self.context)
            .field("launcher", &self.launcher.as_ref().map(|_| "<dyn Launcher>"))
            .finish()
    }
}

impl Bundler {
    /// Creates a session for `settings`.
    pub fn new(settings: Settings) -> Self {
        let context = SessionContext::new(&settings.bundle().app_name, settings.verbose());
        Self {
            settings,
            context,
            launcher: None,
        }
    }

    /// Runs the toolchain through `launcher` instead of a located `java`.
    pub fn with_launcher(mut self, launcher: Box<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Returns a reference to the session settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Runs the whole session.
    ///
    /// # Errors
    ///
    /// The first binding, packaging, signing or bundling failure. Problems in
    /// corrective passes are warnings in the report, not errors.
    pub fn run(self) -> Result<SessionReport> {
        let Self {
            settings,
            context,
            launcher,
        } = self;
        let target = context.target();

        let archive = locate_toolchain(settings.toolchain().archive.as_deref())?;
        let launcher: Box<dyn Launcher> = match launcher {
            Some(launcher) => launcher,
            None => {
                let Some(java) = locate_java(settings.toolchain().java.as_deref(), &archive)
                else {
                    bail!("No java executable found; set JAVA_HOME or toolchain.java");
                };
                log::debug!(target: target, "Using JVM {}", java.display());
                Box::new(JavaLauncher::new(java))
            }
        };

        let binder = ToolBinder::bind(&archive, launcher, context.clone())?;
        let toolchain = binder.location().to_path_buf();

        let capabilities = VersionGate::detect(&binder);
        let options = RequestOptions::from_settings(&settings);
        let policy = VersionGate::decide_policy(&capabilities, &options);
        for note in &policy.notes {
            log::warn!(target: target, "{note}");
        }
        let dialect = VersionGate::select_dialect(&capabilities);
        let dialect_name = dialect.name().to_string();

        let facade = PackagerFacade::new(binder, dialect)?;

        let package = settings.package();
        let dependencies_dir = package.dependencies_dir();
        let jar = facade.package_artifact(
            &package.classes_dir,
            Some(&dependencies_dir),
            &package.main_class,
            &package.output_jar,
        )?;

        let jar_dir = package.jar_dir().to_path_buf();
        let resources = jar_resources(&jar, &jar_dir, &dependencies_dir);

        let signed_jars = match resolve_signing(settings.signing()) {
            Some(signing) => {
                let jars: Vec<PathBuf> = resources.iter().map(|r| jar_dir.join(r)).collect();
                facade.sign_artifact(&jars, &signing)?
            }
            None => Vec::new(),
        };

        let bundle = settings.bundle();
        let launcher_names = bundle.launcher_names();
        let corrector = ArtifactCorrector::new(&bundle.output_dir, context.clone());
        let mut artifacts = Vec::with_capacity(bundle.types.len());
        let mut corrections = CorrectionReport::default();

        for bundle_type in &bundle.types {
            let request = BundleRequest::from_settings(&settings, *bundle_type, resources.clone());
            let paths = facade.generate_distribution_bundles(&request, &policy)?;

            corrections.merge(corrector.apply(&policy, settings.corrections(), &launcher_names));

            let Some(first) = paths.first() else {
                bail!(
                    "Bundling {} returned no artifacts; check the toolchain output above",
                    bundle_type
                );
            };
            // Checksums cover the corrected output
            let checksum = calculate_sha256(first)?;
            let mut size = 0;
            for path in &paths {
                size += artifact_size(path)?;
            }

            log::info!(
                target: target,
                "Created {} bundle: {} path(s), {} bytes",
                bundle_type,
                paths.len(),
                size
            );
            artifacts.push(BundledArtifact {
                bundle_type: *bundle_type,
                paths,
                size,
                checksum,
            });
        }

        Ok(SessionReport {
            app_name: bundle.app_name.clone(),
            toolchain,
            dialect: dialect_name,
            capabilities,
            policy,
            jar,
            signed_jars,
            artifacts,
            corrections,
        })
    }
}

/// The application jar followed by dependency jars, relative to `jar_dir`.
///
/// Dependencies outside `jar_dir` cannot be referenced by the bundle and are
/// skipped with a warning.
fn jar_resources(jar: &Path, jar_dir: &Path, dependencies_dir: &Path) -> Vec<PathBuf> {
    let mut resources = Vec::new();
    if let Some(name) = jar.file_name() {
        resources.push(PathBuf::from(name));
    }

    let Ok(entries) = std::fs::read_dir(dependencies_dir) else {
        return resources;
    };
    let mut dependencies: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("jar")))
        .collect();
    dependencies.sort();

    for dependency in dependencies {
        match dependency.strip_prefix(jar_dir) {
            Ok(relative) => resources.push(relative.to_path_buf()),
            Err(_) => log::warn!(
                "Dependency {} is outside {}; not bundled",
                dependency.display(),
                jar_dir.display()
            ),
        }
    }
    resources
}
