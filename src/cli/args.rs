//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation and
//! the overrides applied on top of the configuration file.

use crate::bundler::{BundleType, Settings};
use clap::Parser;
use std::path::PathBuf;

/// JavaFX packaging toolchain driver
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_jfx",
    version,
    about = "Packages, signs and bundles a JavaFX application with the SDK packager",
    long_about = "Drives the JavaFX packager shipped with the SDK (ant-javafx.jar).

Reads jfx-bundle.toml, packages the application jar, optionally signs it,
creates each requested bundle type, then corrects known toolchain defects in
the output (stale JNLP sizes, backslashes in JNLP hrefs, launcher configs of
dotted application names).

Usage:
  kodegen_bundler_jfx
  kodegen_bundler_jfx --config app/jfx-bundle.toml --bundle-type image --bundle-type jnlp
  kodegen_bundler_jfx --toolchain /opt/jdk1.8.0_60/lib/ant-javafx.jar --report report.json

Signing passwords may be supplied via JFX_STORE_PASSWORD and JFX_KEY_PASSWORD."
)]
pub struct Args {
    /// Configuration file
    #[arg(short, long, value_name = "PATH", default_value = crate::metadata::CONFIG_FILE)]
    pub config: PathBuf,

    /// Packager archive (ant-javafx.jar); detected from JAVA_HOME when omitted
    #[arg(long, value_name = "PATH")]
    pub toolchain: Option<PathBuf>,

    /// java executable used to run the packager
    #[arg(long, value_name = "PATH")]
    pub java: Option<PathBuf>,

    /// Bundle types to create, replacing the configured list
    #[arg(short = 't', long = "bundle-type", value_name = "TYPE")]
    pub bundle_types: Vec<BundleType>,

    /// Write a JSON session report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Ask the packager for verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Config path cannot be empty".to_string());
        }
        if let Some(report) = self.report.as_ref().filter(|r| r.is_dir()) {
            return Err(format!("Report path {} is a directory", report.display()));
        }
        Ok(())
    }

    /// Applies command line overrides to loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(toolchain) = &self.toolchain {
            settings.toolchain_mut().archive = Some(toolchain.clone());
        }
        if let Some(java) = &self.java {
            settings.toolchain_mut().java = Some(java.clone());
        }
        if !self.bundle_types.is_empty() {
            settings.bundle_mut().types = self.bundle_types.clone();
        }
        if self.verbose {
            settings.set_verbose(true);
        }
    }
}
