//! Typed packaging operations over the bound toolchain.
//!
//! [`PackagerFacade`] renders the packager's command line for each operation
//! and runs it through the [`ToolBinder`]. The packager entry point is
//! resolved once, when the facade is built; a toolchain without it cannot
//! package anything and fails construction.

mod dialect;

pub use dialect::{BundleDialect, BundlerParamDialect, ClassicDialect};

use crate::bundler::{
    BindingError, BundlingError, PackagingError, SigningError,
    binder::{ToolArg, ToolBinder, ToolHandle, ToolInstance},
    corrector::select_config_format,
    gate::PolicyDecision,
    settings::{BundleType, SecondaryLauncher, Settings, SigningSettings},
    utils::fs::remove_file_if_exists,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

/// Packager command-line class.
pub const PACKAGER_CLASS: &str = "com.sun.javafx.tools.packager.Main";

/// Packager entry point.
pub const PACKAGER_ENTRY: &str = "com.sun.javafx.tools.packager.Main#main([Ljava/lang/String;)V";

/// Directory under the output dir where native bundles land.
pub const BUNDLES_DIR: &str = "bundles";

/// Web deployment byproducts of a `-deploy` run.
const WEB_DESCRIPTOR_PATTERNS: &[&str] = &["*.jnlp", "*.html"];

/// One `-deploy` invocation.
#[derive(Debug, Clone, Default)]
pub struct BundleRequest {
    pub output_dir: PathBuf,
    /// Directory the jar resources are relative to
    pub src_dir: PathBuf,
    /// Application jar followed by dependency jars, relative to `src_dir`
    pub jar_resources: Vec<PathBuf>,
    pub bundle_type: BundleType,
    pub app_name: String,
    pub version: String,
    pub vendor: Option<String>,
    pub main_class: String,
    pub embed_runtime: bool,
    pub runtime: Option<PathBuf>,
    pub jvm_args: Vec<String>,
    pub jvm_properties: BTreeMap<String, String>,
    pub secondary_launchers: Vec<SecondaryLauncher>,
}

impl BundleRequest {
    /// Builds the request for one bundle type from session settings.
    pub fn from_settings(
        settings: &Settings,
        bundle_type: BundleType,
        jar_resources: Vec<PathBuf>,
    ) -> Self {
        let bundle = settings.bundle();
        let package = settings.package();
        Self {
            output_dir: bundle.output_dir.clone(),
            src_dir: package.jar_dir().to_path_buf(),
            jar_resources,
            bundle_type,
            app_name: bundle.app_name.clone(),
            version: bundle.version.clone(),
            vendor: bundle.vendor.clone(),
            main_class: package.main_class.clone(),
            embed_runtime: bundle.embeds_runtime(),
            runtime: bundle.runtime.clone(),
            jvm_args: bundle.jvm_args.clone(),
            jvm_properties: bundle.jvm_properties.clone(),
            secondary_launchers: bundle.secondary_launchers.clone(),
        }
    }

    fn requests_web_descriptors(&self) -> bool {
        matches!(self.bundle_type, BundleType::Jnlp | BundleType::All)
    }
}

/// Stable packaging operations on top of the binder.
#[derive(Debug)]
pub struct PackagerFacade {
    binder: ToolBinder,
    entry: ToolHandle,
    packager: ToolInstance,
    dialect: Box<dyn BundleDialect>,
}

impl PackagerFacade {
    /// Resolves the packager entry point and prepares a launch context.
    ///
    /// # Errors
    ///
    /// Any [`BindingError`] from resolving or constructing the packager.
    pub fn new(binder: ToolBinder, dialect: Box<dyn BundleDialect>) -> Result<Self, BindingError> {
        let entry = binder.resolve_symbol(PACKAGER_ENTRY)?;
        let class = binder.resolve_symbol(PACKAGER_CLASS)?;
        let packager = binder.construct(&class, Vec::new())?;

        log::debug!(
            target: binder.context().target(),
            "Packager facade ready ({} dialect)",
            dialect.name()
        );

        Ok(Self {
            binder,
            entry,
            packager,
            dialect,
        })
    }

    pub fn binder(&self) -> &ToolBinder {
        &self.binder
    }

    pub fn dialect(&self) -> &dyn BundleDialect {
        self.dialect.as_ref()
    }

    fn target(&self) -> &str {
        self.binder.context().target()
    }

    /// Command name followed by `-v` for verbose sessions.
    fn command(&self, name: &str) -> Vec<ToolArg> {
        let mut args = vec![ToolArg::str(name)];
        if self.binder.context().verbose() {
            args.push(ToolArg::str("-v"));
        }
        args
    }

    fn run(&self, args: &[ToolArg]) -> Result<(), BindingError> {
        self.binder
            .invoke(&self.entry, Some(&self.packager), args)
            .map(|_| ())
    }

    /// Packages `classes_dir` into `output_jar` with `main_class` as entry point.
    ///
    /// Jars in `dependencies_dir` are put on the jar's classpath relative to
    /// the jar's directory. A missing dependency directory is skipped.
    ///
    /// # Errors
    ///
    /// [`PackagingError`] naming the missing input or toolchain failure.
    pub fn package_artifact(
        &self,
        classes_dir: &Path,
        dependencies_dir: Option<&Path>,
        main_class: &str,
        output_jar: &Path,
    ) -> Result<PathBuf, PackagingError> {
        if !classes_dir.is_dir() {
            return Err(PackagingError::MissingClasses(classes_dir.to_path_buf()));
        }
        if main_class.trim().is_empty() {
            return Err(PackagingError::MissingEntryPoint);
        }
        let (Some(out_dir), Some(out_file)) = (output_jar.parent(), output_jar.file_name()) else {
            return Err(PackagingError::InvalidOutput(output_jar.to_path_buf()));
        };
        let out_dir = if out_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            out_dir
        };

        let mut args = self.command("-createjar");
        args.extend([
            ToolArg::str("-appclass"),
            ToolArg::str(main_class),
            ToolArg::str("-srcdir"),
            ToolArg::path(classes_dir),
            ToolArg::str("-outdir"),
            ToolArg::path(out_dir),
            ToolArg::str("-outfile"),
            ToolArg::path(out_file),
        ]);

        let classpath = match dependencies_dir {
            Some(dir) if dir.is_dir() => dependency_classpath(dir, out_dir),
            Some(dir) => {
                log::debug!(
                    target: self.target(),
                    "Dependency directory {} does not exist; packaging without it",
                    dir.display()
                );
                Vec::new()
            }
            None => Vec::new(),
        };
        if !classpath.is_empty() {
            args.push(ToolArg::str("-classpath"));
            args.push(ToolArg::str(classpath.join(",")));
        }

        log::info!(target: self.target(), "Packaging {}", output_jar.display());
        self.run(&args)?;

        if !output_jar.is_file() {
            return Err(PackagingError::OutputMissing(output_jar.to_path_buf()));
        }
        Ok(output_jar.to_path_buf())
    }

    /// Signs each jar in place, one toolchain run per jar.
    ///
    /// Inputs are validated even though callers are expected to have done so;
    /// an invalid request fails instead of leaving jars unsigned.
    ///
    /// # Errors
    ///
    /// [`SigningError`] for a missing keystore or jar, empty credentials, or
    /// toolchain failure.
    pub fn sign_artifact(
        &self,
        jars: &[PathBuf],
        signing: &SigningSettings,
    ) -> Result<Vec<PathBuf>, SigningError> {
        if jars.is_empty() {
            return Err(SigningError::NoJars);
        }
        if !signing.keystore.is_file() {
            return Err(SigningError::KeystoreMissing(signing.keystore.clone()));
        }
        if signing.alias.is_empty() {
            return Err(SigningError::EmptyAlias);
        }
        if signing.store_password.is_empty() {
            return Err(SigningError::EmptyStorePassword);
        }
        if signing.key_password.is_empty() {
            return Err(SigningError::EmptyKeyPassword);
        }
        if let Some(missing) = jars.iter().find(|jar| !jar.is_file()) {
            return Err(SigningError::JarMissing(missing.clone()));
        }

        let mut signed = Vec::with_capacity(jars.len());
        for jar in jars {
            let dir = jar
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let Some(name) = jar.file_name() else {
                return Err(SigningError::JarMissing(jar.clone()));
            };

            let mut args = self.command("-signJar");
            args.extend([
                ToolArg::str("-keyStore"),
                ToolArg::path(&signing.keystore),
                ToolArg::str("-alias"),
                ToolArg::str(&signing.alias),
                ToolArg::str("-storePass"),
                ToolArg::str(&signing.store_password),
                ToolArg::str("-keyPass"),
                ToolArg::str(&signing.key_password),
            ]);
            if !signing.store_type.is_empty() {
                args.push(ToolArg::str("-storeType"));
                args.push(ToolArg::str(&signing.store_type));
            }
            args.extend([
                ToolArg::str("-outdir"),
                ToolArg::path(dir),
                ToolArg::str("-srcdir"),
                ToolArg::path(dir),
                ToolArg::str("-srcfiles"),
                ToolArg::path(name),
            ]);

            log::info!(target: self.target(), "Signing {}", jar.display());
            self.run(&args)?;
            signed.push(jar.clone());
        }
        Ok(signed)
    }

    /// Runs one `-deploy` for `request.bundle_type` and returns what it produced.
    ///
    /// The policy's config format is applied as a bundler parameter before the
    /// toolchain runs. Afterwards web descriptors nobody asked for are deleted
    /// when the policy says so.
    ///
    /// # Errors
    ///
    /// [`BundlingError`] for missing jar resources, unsupported options,
    /// output directory failures, or toolchain failure.
    pub fn generate_distribution_bundles(
        &self,
        request: &BundleRequest,
        policy: &PolicyDecision,
    ) -> Result<Vec<PathBuf>, BundlingError> {
        if let Some(missing) = request
            .jar_resources
            .iter()
            .map(|jar| request.src_dir.join(jar))
            .find(|jar| !jar.is_file())
        {
            return Err(BundlingError::ResourceMissing(missing));
        }

        let params = self.dialect.bundler_params(
            request,
            select_config_format(policy),
            self.binder.context(),
        )?;

        std::fs::create_dir_all(&request.output_dir).map_err(|error| BundlingError::Io {
            context: "creating output directory",
            path: request.output_dir.clone(),
            error,
        })?;

        let bundles_dir = request.output_dir.join(BUNDLES_DIR);
        let before = list_dir(&bundles_dir);

        let mut args = self.command("-deploy");
        args.extend([
            ToolArg::str("-native"),
            ToolArg::str(request.bundle_type.as_selector()),
            ToolArg::str("-name"),
            ToolArg::str(&request.app_name),
            ToolArg::str("-title"),
            ToolArg::str(&request.app_name),
            ToolArg::str("-appclass"),
            ToolArg::str(&request.main_class),
            ToolArg::str("-outdir"),
            ToolArg::path(&request.output_dir),
            ToolArg::str("-outfile"),
            ToolArg::str(&request.app_name),
            ToolArg::str("-srcdir"),
            ToolArg::path(&request.src_dir),
        ]);
        for jar in &request.jar_resources {
            args.push(ToolArg::str("-srcfiles"));
            args.push(ToolArg::path(jar));
        }
        if let Some(vendor) = &request.vendor {
            args.push(ToolArg::str("-vendor"));
            args.push(ToolArg::str(vendor));
        }
        args.push(ToolArg::str(format!("-BappVersion={}", request.version)));
        if !request.embed_runtime {
            args.push(ToolArg::str("-Bruntime="));
        } else if let Some(runtime) = &request.runtime {
            args.push(ToolArg::str(format!("-Bruntime={}", runtime.display())));
        }
        for arg in &request.jvm_args {
            args.push(ToolArg::str(format!("-BjvmOptions={arg}")));
        }
        for (key, value) in &request.jvm_properties {
            args.push(ToolArg::str(format!("-BjvmProperties={key}={value}")));
        }
        args.extend(params);

        log::info!(
            target: self.target(),
            "Generating {} bundle for {} into {}",
            request.bundle_type,
            request.app_name,
            request.output_dir.display()
        );
        self.run(&args)?;

        if policy.remove_unrequested_descriptors && !request.requests_web_descriptors() {
            self.remove_web_descriptors(&request.output_dir)?;
        }

        let after = list_dir(&bundles_dir);
        let fresh: Vec<PathBuf> = after.difference(&before).cloned().collect();
        // A rerun over an existing output dir replaces bundles in place
        let mut produced = if fresh.is_empty() {
            after.into_iter().collect()
        } else {
            fresh
        };
        if request.requests_web_descriptors() {
            produced.extend(self.web_descriptors(&request.output_dir)?);
        }
        Ok(produced)
    }

    fn web_descriptors(&self, output_dir: &Path) -> Result<Vec<PathBuf>, BundlingError> {
        let escaped = glob::Pattern::escape(&output_dir.to_string_lossy());
        let mut found = Vec::new();
        for pattern in WEB_DESCRIPTOR_PATTERNS {
            let full = format!("{escaped}/{pattern}");
            let paths = glob::glob(&full).map_err(|e| BundlingError::Io {
                context: "listing web descriptors in",
                path: output_dir.to_path_buf(),
                error: std::io::Error::other(e),
            })?;
            found.extend(paths.filter_map(|p| p.ok()).filter(|p| p.is_file()));
        }
        found.sort();
        Ok(found)
    }

    fn remove_web_descriptors(&self, output_dir: &Path) -> Result<(), BundlingError> {
        for descriptor in self.web_descriptors(output_dir)? {
            match remove_file_if_exists(&descriptor) {
                Ok(true) => log::info!(
                    target: self.target(),
                    "Removed unrequested {}",
                    descriptor.display()
                ),
                Ok(false) => {}
                Err(e) => log::warn!(target: self.target(), "{e}"),
            }
        }
        Ok(())
    }
}

/// Jars in `dir`, as paths relative to `jar_dir` with forward slashes.
fn dependency_classpath(dir: &Path, jar_dir: &Path) -> Vec<String> {
    let mut jars: Vec<String> = list_dir(dir)
        .into_iter()
        .filter(|p| {
            p.extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("jar"))
        })
        .filter_map(|p| {
            let relative = match p.strip_prefix(jar_dir) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => Path::new("lib").join(p.file_name()?),
            };
            Some(relative.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    jars.sort();
    jars
}

fn list_dir(dir: &Path) -> BTreeSet<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        SessionContext,
        binder::LaunchOutput,
        testing::{ClassSpec, RecordingLauncher, flag_value, write_toolchain},
    };
    use std::fs;

    fn facade(dir: &Path, launcher: RecordingLauncher, verbose: bool) -> PackagerFacade {
        let jar = write_toolchain(dir, "8.0.60", &[ClassSpec::entry_point(PACKAGER_CLASS)]);
        let binder =
            ToolBinder::bind(&jar, Box::new(launcher), SessionContext::new("test", verbose))
                .unwrap();
        PackagerFacade::new(binder, Box::new(BundlerParamDialect::new(true))).unwrap()
    }

    /// Launcher that writes the `-outfile` jar for `-createjar`.
    fn jar_writing_launcher() -> RecordingLauncher {
        RecordingLauncher::with_effect(|req| {
            let args = req.args_lossy();
            if args.first().map(String::as_str) == Some("-createjar") {
                let out = PathBuf::from(flag_value(&args, "-outdir").unwrap())
                    .join(flag_value(&args, "-outfile").unwrap());
                fs::write(out, b"PK").unwrap();
            }
            Ok(LaunchOutput {
                status_code: Some(0),
                ..Default::default()
            })
        })
    }

    #[test]
    fn construction_requires_packager_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let jar = write_toolchain(dir.path(), "", &[ClassSpec::plain("other.Tool")]);
        let binder = ToolBinder::bind(
            &jar,
            Box::new(RecordingLauncher::default()),
            SessionContext::default(),
        )
        .unwrap();
        let err = PackagerFacade::new(binder, Box::new(ClassicDialect)).unwrap_err();
        assert!(err.to_string().contains(PACKAGER_CLASS));
    }

    #[test]
    fn package_artifact_renders_createjar() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        let out = dir.path().join("app");
        fs::create_dir_all(&classes).unwrap();
        fs::create_dir_all(out.join("lib")).unwrap();
        fs::write(out.join("lib/dep.jar"), b"PK").unwrap();

        let launcher = jar_writing_launcher();
        let facade = facade(dir.path(), launcher.clone(), true);
        let jar = facade
            .package_artifact(&classes, Some(&out.join("lib")), "com.example.App", &out.join("app.jar"))
            .unwrap();

        assert!(jar.is_file());
        let args = launcher.calls()[0].args_lossy();
        assert_eq!(&args[..2], ["-createjar", "-v"]);
        assert_eq!(flag_value(&args, "-appclass").as_deref(), Some("com.example.App"));
        assert_eq!(flag_value(&args, "-classpath").as_deref(), Some("lib/dep.jar"));
    }

    #[test]
    fn package_artifact_omits_missing_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        fs::create_dir_all(&classes).unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();

        let launcher = jar_writing_launcher();
        let facade = facade(dir.path(), launcher.clone(), false);
        facade
            .package_artifact(
                &classes,
                Some(&dir.path().join("absent")),
                "com.example.App",
                &dir.path().join("app/app.jar"),
            )
            .unwrap();
        let args = launcher.calls()[0].args_lossy();
        assert!(!args.contains(&"-classpath".to_string()));
        assert!(!args.contains(&"-v".to_string()));
    }

    #[test]
    fn package_artifact_detects_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        fs::create_dir_all(&classes).unwrap();

        let facade = facade(dir.path(), RecordingLauncher::default(), false);
        let err = facade
            .package_artifact(&classes, None, "com.example.App", &dir.path().join("app.jar"))
            .unwrap_err();
        assert!(matches!(err, PackagingError::OutputMissing(_)));

        let err = facade
            .package_artifact(&dir.path().join("nope"), None, "X", &dir.path().join("app.jar"))
            .unwrap_err();
        assert!(matches!(err, PackagingError::MissingClasses(_)));
    }

    #[test]
    fn signing_validates_before_invoking() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("app.jar");
        let keystore = dir.path().join("ks.jks");
        fs::write(&jar, b"PK").unwrap();
        fs::write(&keystore, b"ks").unwrap();

        let launcher = RecordingLauncher::default();
        let facade = facade(dir.path(), launcher.clone(), false);
        let mut signing = SigningSettings {
            keystore: keystore.clone(),
            alias: "me".into(),
            store_password: "pw".into(),
            key_password: String::new(),
            store_type: "jks".into(),
        };

        let err = facade.sign_artifact(&[jar.clone()], &signing).unwrap_err();
        assert!(matches!(err, SigningError::EmptyKeyPassword));
        assert!(launcher.calls().is_empty());

        signing.key_password = "pw".into();
        let missing = facade
            .sign_artifact(&[dir.path().join("gone.jar")], &signing)
            .unwrap_err();
        assert!(matches!(missing, SigningError::JarMissing(_)));

        let signed = facade.sign_artifact(&[jar.clone()], &signing).unwrap();
        assert_eq!(signed, vec![jar]);
        let args = launcher.calls()[0].args_lossy();
        assert_eq!(args[0], "-signJar");
        assert_eq!(flag_value(&args, "-alias").as_deref(), Some("me"));
        assert_eq!(flag_value(&args, "-srcfiles").as_deref(), Some("app.jar"));
    }

    #[test]
    fn bundling_forces_config_format_and_cleans_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("app.jar"), b"PK").unwrap();
        let out = dir.path().join("native");

        let launcher = RecordingLauncher::with_effect(|req| {
            let args = req.args_lossy();
            let out = PathBuf::from(flag_value(&args, "-outdir").unwrap());
            fs::create_dir_all(out.join("bundles/MyApp/app")).unwrap();
            fs::write(out.join("bundles/MyApp/app/MyApp.cfg"), b"cfg").unwrap();
            fs::write(out.join("MyApp.jnlp"), b"<jnlp/>").unwrap();
            fs::write(out.join("MyApp.html"), b"<html/>").unwrap();
            Ok(LaunchOutput {
                status_code: Some(0),
                ..Default::default()
            })
        });
        let facade = facade(dir.path(), launcher.clone(), false);

        let request = BundleRequest {
            output_dir: out.clone(),
            src_dir: src,
            jar_resources: vec!["app.jar".into()],
            bundle_type: BundleType::Image,
            app_name: "MyApp".into(),
            version: "1.0".into(),
            main_class: "com.example.App".into(),
            embed_runtime: true,
            ..Default::default()
        };
        let policy = PolicyDecision {
            config_format: Some(crate::bundler::gate::ConfigFormat::Prop),
            remove_unrequested_descriptors: true,
            ..Default::default()
        };

        let produced = facade.generate_distribution_bundles(&request, &policy).unwrap();

        assert_eq!(produced, vec![out.join("bundles/MyApp")]);
        assert!(!out.join("MyApp.jnlp").exists());
        assert!(!out.join("MyApp.html").exists());

        let args = launcher.calls()[0].args_lossy();
        assert_eq!(flag_value(&args, "-native").as_deref(), Some("image"));
        assert!(args.contains(&"-Blauncher-cfg-format=prop".to_string()));
        assert!(args.contains(&"-BappVersion=1.0".to_string()));
    }

    #[test]
    fn bundling_keeps_requested_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("app.jar"), b"PK").unwrap();
        let out = dir.path().join("web");

        let launcher = RecordingLauncher::with_effect(|req| {
            let args = req.args_lossy();
            let out = PathBuf::from(flag_value(&args, "-outdir").unwrap());
            fs::write(out.join("MyApp.jnlp"), b"<jnlp/>").unwrap();
            Ok(LaunchOutput {
                status_code: Some(0),
                ..Default::default()
            })
        });
        let facade = facade(dir.path(), launcher, false);
        let request = BundleRequest {
            output_dir: out.clone(),
            src_dir: src,
            jar_resources: vec!["app.jar".into()],
            bundle_type: BundleType::Jnlp,
            app_name: "MyApp".into(),
            version: "1.0".into(),
            main_class: "com.example.App".into(),
            ..Default::default()
        };
        let policy = PolicyDecision {
            remove_unrequested_descriptors: true,
            ..Default::default()
        };

        let produced = facade.generate_distribution_bundles(&request, &policy).unwrap();
        assert_eq!(produced, vec![out.join("MyApp.jnlp")]);
    }

    #[test]
    fn bundling_reports_missing_resources_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let facade = facade(dir.path(), RecordingLauncher::failing(1, "Error: no bundler"), false);
        let request = BundleRequest {
            output_dir: dir.path().join("out"),
            src_dir: dir.path().to_path_buf(),
            jar_resources: vec!["missing.jar".into()],
            ..Default::default()
        };
        let err = facade
            .generate_distribution_bundles(&request, &PolicyDecision::default())
            .unwrap_err();
        assert!(matches!(err, BundlingError::ResourceMissing(_)));

        let request = BundleRequest {
            jar_resources: Vec::new(),
            ..request
        };
        let err = facade
            .generate_distribution_bundles(&request, &PolicyDecision::default())
            .unwrap_err();
        assert!(err.to_string().contains("Error: no bundler"));
        assert!(err.to_string().starts_with("generate_distribution_bundles:"));
    }
}
