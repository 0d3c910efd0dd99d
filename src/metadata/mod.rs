//! Session settings from `jfx-bundle.toml`

use crate::bundler::Settings;
use crate::error::{BundlerError, CliError, Result};
use path_absolutize::Absolutize;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "jfx-bundle.toml";

/// Load session settings from a TOML configuration file.
///
/// Relative paths in the file are resolved against the file's directory, so
/// a configuration behaves the same from any working directory.
pub fn load_settings(config_path: &Path) -> Result<Settings> {
    let contents = std::fs::read_to_string(config_path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("Failed to read {}: {}", config_path.display(), e),
        })
    })?;

    let mut settings = parse_settings(&contents)?;

    let config_path = config_path.absolutize()?;
    let base = config_path.parent().ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: format!("Invalid config path: {}", config_path.display()),
        })
    })?;
    settings.rebase_paths(base);

    Ok(settings)
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents)?;
    validate(&settings)?;
    Ok(settings)
}

/// Checks fields that deserialize fine but make no sense empty.
fn validate(settings: &Settings) -> Result<()> {
    let missing = |argument: &str| {
        Err(BundlerError::Cli(CliError::MissingArgument {
            argument: argument.to_string(),
        }))
    };

    if settings.package().main_class.trim().is_empty() {
        return missing("package.main_class");
    }
    if settings.bundle().app_name.trim().is_empty() {
        return missing("bundle.app_name");
    }
    if settings.bundle().types.is_empty() {
        return Err(BundlerError::Cli(CliError::InvalidArguments {
            reason: "bundle.types must name at least one bundle type".to_string(),
        }));
    }
    Ok(())
}
