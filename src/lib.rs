//! Version-tolerant adapter for the JavaFX packaging toolchain
//!
//! This library binds to the SDK-bundled packager archive at runtime and
//! provides:
//! - Capability probing of the bound toolchain version
//! - Typed packaging, signing and bundling operations
//! - Correction passes for defects the toolchain leaves in its output
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
