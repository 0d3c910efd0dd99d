//! Session orchestration and coordination.
//!
//! This module provides the [`Bundler`] session that drives the toolchain
//! from a [`Settings`](crate::bundler::Settings) to a [`SessionReport`].
//!
//! # Overview
//!
//! The session:
//! 1. Locates the toolchain archive and a JVM
//! 2. Binds the archive and detects its capabilities
//! 3. Decides the correction policy and picks a bundling dialect
//! 4. Packages, optionally signs, and bundles each requested type in turn
//! 5. Runs the enabled corrective passes and checksums the results
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_jfx::bundler::{Bundler, BundleSettings, PackageSettings, SettingsBuilder};
//!
//! # fn example() -> kodegen_bundler_jfx::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .package_settings(PackageSettings {
//!         classes_dir: "target/classes".into(),
//!         main_class: "com.example.App".into(),
//!         output_jar: "target/jfx/app/app.jar".into(),
//!         ..Default::default()
//!     })
//!     .bundle_settings(BundleSettings {
//!         output_dir: "target/jfx/native".into(),
//!         app_name: "My.App".into(),
//!         version: "1.0.0".into(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let report = Bundler::new(settings).run()?;
//! println!("{} correction warnings", report.corrections.warnings.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum and size calculation for artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct and session flow
//! - [`signing`] - Signing credentials from the environment
//! - [`tool_detection`] - Toolchain archive and JVM discovery

pub mod checksum;
mod orchestrator;
pub mod signing;
pub mod tool_detection;

pub use orchestrator::{Bundler, SessionReport};
