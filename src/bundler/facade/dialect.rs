//! Bundling dialects.
//!
//! Toolchain releases differ in which bundler parameters they understand.
//! One [`BundleDialect`] per family renders the version-dependent part of a
//! `-deploy` command; the rest is shared by the facade. The gate picks the
//! dialect once per session from the detected capabilities.

use super::BundleRequest;
use crate::bundler::{
    BundlingError, SessionContext, binder::ToolArg, gate::ConfigFormat,
};
use std::fmt;

/// Version-dependent rendering of bundler parameters.
pub trait BundleDialect: fmt::Debug {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Parameters for the config format directive and secondary launchers.
    ///
    /// # Errors
    ///
    /// [`BundlingError::Unsupported`] when the request needs something this
    /// toolchain family cannot express.
    fn bundler_params(
        &self,
        request: &BundleRequest,
        config_format: Option<ConfigFormat>,
        context: &SessionContext,
    ) -> Result<Vec<ToolArg>, BundlingError>;
}

/// Toolchains that accept `launcher-cfg-format` and, optionally, secondary
/// launchers as bundler parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundlerParamDialect {
    secondary_launchers: bool,
}

impl BundlerParamDialect {
    pub fn new(secondary_launchers: bool) -> Self {
        Self {
            secondary_launchers,
        }
    }
}

impl BundleDialect for BundlerParamDialect {
    fn name(&self) -> &'static str {
        "bundler-params"
    }

    fn bundler_params(
        &self,
        request: &BundleRequest,
        config_format: Option<ConfigFormat>,
        _context: &SessionContext,
    ) -> Result<Vec<ToolArg>, BundlingError> {
        let mut params = Vec::new();

        if let Some(format) = config_format {
            params.push(ToolArg::str(format!(
                "-Blauncher-cfg-format={}",
                format.as_param()
            )));
        }

        if !request.secondary_launchers.is_empty() {
            if !self.secondary_launchers {
                return Err(BundlingError::Unsupported("secondary launchers".into()));
            }
            let names: Vec<&str> = request
                .secondary_launchers
                .iter()
                .map(|l| l.name.as_str())
                .collect();
            params.push(ToolArg::str(format!("-BsecondaryLaunchers={}", names.join(","))));

            for launcher in &request.secondary_launchers {
                let main_class = launcher
                    .main_class
                    .as_deref()
                    .unwrap_or(&request.main_class);
                params.push(ToolArg::str(format!(
                    "-BsecondaryLauncher.{}.mainClass={main_class}",
                    launcher.name
                )));
                for arg in &launcher.jvm_args {
                    params.push(ToolArg::str(format!(
                        "-BsecondaryLauncher.{}.jvmOptions={arg}",
                        launcher.name
                    )));
                }
            }
        }

        Ok(params)
    }
}

/// Older toolchains without bundler parameters for either feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassicDialect;

impl BundleDialect for ClassicDialect {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn bundler_params(
        &self,
        request: &BundleRequest,
        config_format: Option<ConfigFormat>,
        context: &SessionContext,
    ) -> Result<Vec<ToolArg>, BundlingError> {
        if !request.secondary_launchers.is_empty() {
            return Err(BundlingError::Unsupported("secondary launchers".into()));
        }
        if let Some(format) = config_format {
            log::warn!(
                target: context.target(),
                "Toolchain cannot select launcher config format '{}'; bundling with its default",
                format.as_param()
            );
        }
        Ok(Vec::new())
    }
}
