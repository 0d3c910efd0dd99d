//! Kodegen Bundler JFX - JavaFX packaging toolchain driver.
//!
//! This binary packages, signs and bundles a JavaFX application through the
//! SDK's packager archive, then corrects known defects in the produced artifacts.

use std::process;

fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match kodegen_bundler_jfx::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
