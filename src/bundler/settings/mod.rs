//! Configuration structures for packaging sessions.
//!
//! This module provides the request types handed to the session (what to
//! package, sign and bundle, and where), the toolchain location, and the
//! correction toggles, plus a builder for constructing them in code.

mod builder;
mod bundle;
mod core;
mod package;
mod signing;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use bundle::{BundleSettings, BundleType, SecondaryLauncher};
pub use core::{Settings, ToolchainSettings};
pub use package::PackageSettings;
pub use signing::SigningSettings;
