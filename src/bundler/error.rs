//! Error types for binding, packaging and correction.
//!
//! The taxonomy mirrors how failures are treated by the session:
//! [`BindingError`] comes from the toolchain bridge, the three operation errors
//! are fatal and surfaced verbatim, and filesystem context errors from the
//! corrective passes are logged and skipped by their callers.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant of a [`BindingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingErrorKind {
    /// The toolchain archive could not be opened.
    ToolchainNotFound,
    /// A class or member is absent from the bound toolchain.
    SymbolMissing,
    /// Launching or running a bound entry point failed.
    InvocationFailed,
}

/// Failure raised by the toolchain bridge.
///
/// `SymbolMissing` is the expected outcome of a capability check and is
/// consumed as data by the version gate.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Toolchain archive is absent or is not a readable archive.
    #[error(
        "packaging toolchain not found at {}: {reason} (expected layout: {expected_layout})",
        location.display()
    )]
    ToolchainNotFound {
        /// Location that was tried
        location: PathBuf,
        /// Install layout the adapter looked under
        expected_layout: String,
        /// What went wrong
        reason: String,
    },

    /// Class or member absent from the bound toolchain.
    #[error("symbol `{symbol}` is not present in the bound toolchain")]
    SymbolMissing {
        /// Qualified symbol name
        symbol: String,
    },

    /// Construction or invocation failed.
    #[error("invoking `{symbol}` failed: {cause}")]
    InvocationFailed {
        /// Qualified symbol being constructed or invoked
        symbol: String,
        /// Underlying cause
        cause: String,
    },
}

impl BindingError {
    /// Returns the error discriminant.
    pub fn kind(&self) -> BindingErrorKind {
        match self {
            BindingError::ToolchainNotFound { .. } => BindingErrorKind::ToolchainNotFound,
            BindingError::SymbolMissing { .. } => BindingErrorKind::SymbolMissing,
            BindingError::InvocationFailed { .. } => BindingErrorKind::InvocationFailed,
        }
    }

    pub(crate) fn invocation(symbol: impl Display, cause: impl Display) -> Self {
        BindingError::InvocationFailed {
            symbol: symbol.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Failure of `package_artifact`.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Compiled classes directory does not exist
    #[error("package_artifact: classes directory {} does not exist", .0.display())]
    MissingClasses(PathBuf),

    /// Main entry point is empty
    #[error("package_artifact: main entry point is empty")]
    MissingEntryPoint,

    /// Toolchain reported success without writing the jar
    #[error("package_artifact: toolchain did not write {}", .0.display())]
    OutputMissing(PathBuf),

    /// Output path has no usable file name or parent
    #[error("package_artifact: invalid output file {}", .0.display())]
    InvalidOutput(PathBuf),

    /// Toolchain bridge failure
    #[error("package_artifact: {0}")]
    Binding(#[from] BindingError),
}

/// Failure of `sign_artifact`.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Keystore file is absent
    #[error("sign_artifact: keystore {} does not exist", .0.display())]
    KeystoreMissing(PathBuf),

    /// Alias is an empty string
    #[error("sign_artifact: keystore alias is empty")]
    EmptyAlias,

    /// Store password is an empty string
    #[error("sign_artifact: keystore password is empty")]
    EmptyStorePassword,

    /// Key password is an empty string
    #[error("sign_artifact: key password is empty")]
    EmptyKeyPassword,

    /// No jar files were given
    #[error("sign_artifact: no jar files to sign")]
    NoJars,

    /// A jar to sign does not exist
    #[error("sign_artifact: jar {} does not exist", .0.display())]
    JarMissing(PathBuf),

    /// Toolchain bridge failure
    #[error("sign_artifact: {0}")]
    Binding(#[from] BindingError),
}

/// Failure of `generate_distribution_bundles`.
#[derive(Debug, Error)]
pub enum BundlingError {
    /// Requested option is not supported by the bound toolchain
    #[error("generate_distribution_bundles: {0} is not supported by the bound toolchain")]
    Unsupported(String),

    /// A jar resource does not exist
    #[error("generate_distribution_bundles: jar resource {} does not exist", .0.display())]
    ResourceMissing(PathBuf),

    /// Filesystem failure while preparing or collecting output
    #[error("generate_distribution_bundles: {context} {}: {error}", path.display())]
    Io {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// Toolchain bridge failure
    #[error("generate_distribution_bundles: {0}")]
    Binding(#[from] BindingError),
}

/// Main error type for bundler operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Toolchain bridge failure outside a facade operation
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Packaging failure
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// Signing failure
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Bundling failure
    #[error(transparent)]
    Bundling(#[from] BundlingError),

    /// Filesystem failure with context
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// Directory traversal errors
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Any other failure
    #[error("{0}")]
    GenericError(String),
}

/// Attaches a message to `Option`/`Result` values.
pub trait Context<T> {
    /// Converts into a bundler error carrying `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Attaches a filesystem path to IO failures.
pub trait ErrorExt<T> {
    /// Maps an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_error_names_symbol() {
        let err = BindingError::invocation("com.example.Main#main", "exit status 2");
        assert_eq!(err.kind(), BindingErrorKind::InvocationFailed);
        assert!(err.to_string().contains("com.example.Main#main"));
    }

    #[test]
    fn facade_errors_name_operation() {
        let err = SigningError::KeystoreMissing(PathBuf::from("/tmp/missing.jks"));
        assert!(err.to_string().starts_with("sign_artifact:"));

        let err = PackagingError::Binding(BindingError::SymbolMissing {
            symbol: "a.B".into(),
        });
        assert!(err.to_string().starts_with("package_artifact:"));
        assert!(err.to_string().contains("a.B"));
    }

    #[test]
    fn context_wraps_missing_values_and_errors() {
        let missing: Option<u8> = None;
        assert_eq!(
            missing.context("bundle_settings is required").unwrap_err().to_string(),
            "bundle_settings is required"
        );

        let failed: std::result::Result<(), &str> = Err("bad header");
        let err = failed.context("reading manifest").unwrap_err();
        assert_eq!(err.to_string(), "reading manifest: bad header");
    }

    #[test]
    fn fs_context_keeps_path() {
        let io: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.fs_context("reading descriptor", "/out/app.jnlp").unwrap_err();
        assert!(err.to_string().contains("/out/app.jnlp"));
    }
}
