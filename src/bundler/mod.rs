//! Packaging core: toolchain binding, capability gating, typed operations and
//! artifact correction.
//!
//! A session ([`Bundler`]) binds the toolchain archive ([`binder`]), detects its
//! capabilities ([`gate`]), runs packaging, signing and bundling through the
//! facade ([`facade`]) and finally fixes known defects in the output
//! ([`corrector`]).

pub mod binder;
pub mod builder;
pub mod context;
pub mod corrector;
pub mod error;
pub mod facade;
pub mod gate;
pub mod settings;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{Bundler, SessionReport};
pub use context::SessionContext;
pub use error::{
    BindingError, BindingErrorKind, BundlingError, Error, PackagingError, Result, SigningError,
};
pub use settings::{
    BundleSettings, BundleType, PackageSettings, SecondaryLauncher, Settings, SettingsBuilder,
    SigningSettings, ToolchainSettings,
};

use serde::Serialize;
use std::path::PathBuf;

/// Output of one bundle type.
#[derive(Debug, Clone, Serialize)]
pub struct BundledArtifact {
    /// Bundle type that produced the paths
    pub bundle_type: BundleType,
    /// Produced files and directories
    pub paths: Vec<PathBuf>,
    /// Total size in bytes
    pub size: u64,
    /// SHA-256 of the first path, hex encoded
    pub checksum: String,
}
