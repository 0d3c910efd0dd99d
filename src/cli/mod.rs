//! Command line interface for the JavaFX bundler.
//!
//! Loads `jfx-bundle.toml`, applies command line overrides, runs one
//! packaging session and prints what it produced.

mod args;

pub use args::Args;

use crate::{
    bundler::{Bundler, SessionReport},
    error::{BundlerError, CliError, Result},
    metadata,
};
use anyhow::Context as _;

/// Exit code for failures reported by the packaging toolchain.
pub const TOOLCHAIN_FAILURE_EXIT: i32 = 2;

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args)
}

/// Runs a session for already parsed arguments.
pub fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let mut settings = metadata::load_settings(&args.config)?;
    args.apply_overrides(&mut settings);

    let report = match Bundler::new(settings).run().map_err(BundlerError::from) {
        Ok(report) => report,
        Err(e) if e.is_toolchain_failure() => {
            eprintln!("Error: {e}");
            return Ok(TOOLCHAIN_FAILURE_EXIT);
        }
        Err(e) => return Err(e),
    };

    print_summary(&report);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(0)
}

fn print_summary(report: &SessionReport) {
    println!("Packaged {} -> {}", report.app_name, report.jar.display());
    for jar in &report.signed_jars {
        println!("  signed {}", jar.display());
    }
    for artifact in &report.artifacts {
        println!(
            "Created {} bundle ({} bytes, sha256 {})",
            artifact.bundle_type, artifact.size, artifact.checksum
        );
        for path in &artifact.paths {
            println!("  {}", path.display());
        }
    }

    let corrections = &report.corrections;
    if !corrections.rewritten.is_empty() || !corrections.renamed.is_empty() {
        println!(
            "Corrected {} descriptor(s), renamed {} launcher config(s)",
            corrections.rewritten.len(),
            corrections.renamed.len()
        );
    }
    for warning in &corrections.warnings {
        println!("warning: {warning}");
    }
}
