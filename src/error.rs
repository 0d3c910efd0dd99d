//! Top-level error types for the CLI and configuration surface.
//!
//! Packaging failures live in [`crate::bundler::Error`]; this module wraps them
//! together with configuration and argument errors.

use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument or configuration key
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Whether the failure came from the bound toolchain rather than from
    /// configuration or the CLI surface.
    pub fn is_toolchain_failure(&self) -> bool {
        matches!(
            self,
            BundlerError::Bundler(
                crate::bundler::Error::Binding(_)
                    | crate::bundler::Error::Packaging(_)
                    | crate::bundler::Error::Signing(_)
                    | crate::bundler::Error::Bundling(_)
            )
        )
    }
}
