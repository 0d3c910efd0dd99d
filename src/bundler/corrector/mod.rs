//! Post-processing passes over the bundling output.
//!
//! The toolchain leaves known defects in what it writes. Each pass here fixes
//! one of them, rescans the tree before doing anything, writes only files whose
//! bytes actually change, and is safe to run again. I/O failures inside a pass
//! are logged as warnings and leave the affected file as it was; they never
//! fail the session.
//!
//! # Passes
//!
//! - [`ArtifactCorrector::rename_launcher_config_if_needed`]
//! - [`ArtifactCorrector::recompute_jnlp_sizes`]
//! - [`ArtifactCorrector::normalize_jnlp_paths`]
//!
//! [`select_config_format`] belongs to the same family but runs before
//! bundling, as a parameter instead of a file edit.

pub mod jnlp;
pub mod launcher_cfg;
pub mod tree;

pub use tree::{ArtifactTree, FileSizeIndex};

use crate::bundler::{
    context::SessionContext,
    gate::{ConfigFormat, PolicyDecision},
    utils::fs::{rename_replacing, write_atomic},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-pass switches from configuration.
///
/// A pass runs only when its toggle and the session policy both enable it.
///
/// ```toml
/// [corrections]
/// rename_launcher_configs = true
/// recompute_jnlp_sizes = true
/// normalize_jnlp_paths = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionToggles {
    pub rename_launcher_configs: bool,
    pub recompute_jnlp_sizes: bool,
    pub normalize_jnlp_paths: bool,
}

impl Default for CorrectionToggles {
    fn default() -> Self {
        Self {
            rename_launcher_configs: true,
            recompute_jnlp_sizes: true,
            normalize_jnlp_paths: true,
        }
    }
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    /// Files whose content was replaced
    pub rewritten: Vec<PathBuf>,
    /// `(from, to)` launcher config renames
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Problems that were logged and skipped
    pub warnings: Vec<String>,
}

impl PassOutcome {
    /// Whether the pass left the tree untouched.
    pub fn is_noop(&self) -> bool {
        self.rewritten.is_empty() && self.renamed.is_empty()
    }
}

/// Aggregate of every pass run over one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionReport {
    /// Names of the passes that ran, in order
    pub passes: Vec<&'static str>,
    pub rewritten: Vec<PathBuf>,
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub warnings: Vec<String>,
}

impl CorrectionReport {
    /// Folds one pass outcome into the report.
    pub fn record(&mut self, pass: &'static str, outcome: PassOutcome) {
        self.passes.push(pass);
        self.rewritten.extend(outcome.rewritten);
        self.renamed.extend(outcome.renamed);
        self.warnings.extend(outcome.warnings);
    }

    /// Appends another report, e.g. from a later bundle target.
    pub fn merge(&mut self, other: CorrectionReport) {
        self.passes.extend(other.passes);
        self.rewritten.extend(other.rewritten);
        self.renamed.extend(other.renamed);
        self.warnings.extend(other.warnings);
    }
}

/// Config format to pass to the toolchain, decided ahead of bundling.
pub fn select_config_format(policy: &PolicyDecision) -> Option<ConfigFormat> {
    policy.config_format
}

/// Runs corrective passes over the tree rooted at a bundling output directory.
#[derive(Debug, Clone)]
pub struct ArtifactCorrector {
    root: PathBuf,
    context: SessionContext,
}

impl ArtifactCorrector {
    pub fn new(root: impl Into<PathBuf>, context: SessionContext) -> Self {
        Self {
            root: root.into(),
            context,
        }
    }

    /// Runs every pass enabled by both `policy` and `toggles`.
    ///
    /// Paths are normalized before sizes are recomputed so that size lookups
    /// see the corrected hrefs.
    pub fn apply(
        &self,
        policy: &PolicyDecision,
        toggles: &CorrectionToggles,
        launcher_names: &[String],
    ) -> CorrectionReport {
        let mut report = CorrectionReport::default();

        if policy.normalize_jnlp_paths && toggles.normalize_jnlp_paths {
            report.record("normalize-jnlp-paths", self.normalize_jnlp_paths());
        }
        if policy.recompute_jnlp_sizes && toggles.recompute_jnlp_sizes {
            report.record("recompute-jnlp-sizes", self.recompute_jnlp_sizes());
        }
        if policy.rename_launcher_configs && toggles.rename_launcher_configs {
            if let Some((app_name, secondary)) = launcher_names.split_first() {
                report.record(
                    "rename-launcher-configs",
                    self.rename_launcher_config_if_needed(app_name, secondary),
                );
            }
        }

        for warning in &report.warnings {
            log::warn!(target: self.context.target(), "{warning}");
        }
        report
    }

    /// Renames `app/<name>.cfg` to `app/<name up to its last dot>.cfg` for the
    /// primary launcher and every secondary launcher whose name has a dot.
    /// A config left by an earlier build under the truncated name is replaced.
    ///
    /// A failed rename leaves that launcher as produced and is reported as a
    /// warning; the other launchers are still processed.
    pub fn rename_launcher_config_if_needed(
        &self,
        app_name: &str,
        secondary_names: &[String],
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let Some(tree) = self.scan(&mut outcome) else {
            return outcome;
        };

        let names = std::iter::once(app_name).chain(secondary_names.iter().map(String::as_str));
        for name in names {
            let Some(truncated) = launcher_cfg::truncated_name(name) else {
                continue;
            };
            for config in launcher_cfg::find_configs(tree.files(), name) {
                let target = launcher_cfg::renamed_path(config, truncated);
                match rename_replacing(config, &target) {
                    Ok(()) => {
                        log::info!(
                            target: self.context.target(),
                            "Renamed launcher config {} -> {}",
                            config.display(),
                            target.display()
                        );
                        outcome.renamed.push((config.to_path_buf(), target));
                    }
                    Err(e) => outcome.warnings.push(format!(
                        "launcher '{name}' may not start: could not rename its config: {e}"
                    )),
                }
            }
        }
        outcome
    }

    /// Brings every jar `size` attribute in every `*.jnlp` back in line with
    /// the jar's current length on disk.
    pub fn recompute_jnlp_sizes(&self) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let Some(tree) = self.scan(&mut outcome) else {
            return outcome;
        };
        let index = tree.size_index();
        log::debug!(
            target: self.context.target(),
            "Indexed {} file size(s) under {}",
            index.len(),
            self.root.display()
        );
        self.rewrite_descriptors(&tree, &mut outcome, |content| {
            jnlp::recompute_sizes(content, &index)
        });
        outcome
    }

    /// Replaces backslashes with forward slashes inside descriptor `href` values.
    pub fn normalize_jnlp_paths(&self) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let Some(tree) = self.scan(&mut outcome) else {
            return outcome;
        };
        self.rewrite_descriptors(&tree, &mut outcome, jnlp::normalize_paths);
        outcome
    }

    fn scan(&self, outcome: &mut PassOutcome) -> Option<ArtifactTree> {
        match ArtifactTree::scan(&self.root) {
            Ok(tree) => Some(tree),
            Err(e) => {
                outcome
                    .warnings
                    .push(format!("skipping pass, cannot scan {}: {e}", self.root.display()));
                None
            }
        }
    }

    fn rewrite_descriptors<F>(&self, tree: &ArtifactTree, outcome: &mut PassOutcome, mut edit: F)
    where
        F: FnMut(&[u8]) -> jnlp::Rewrite,
    {
        for descriptor in tree.files_with_extension("jnlp") {
            let content = match std::fs::read(descriptor) {
                Ok(content) => content,
                Err(e) => {
                    outcome
                        .warnings
                        .push(format!("cannot read {}: {e}", descriptor.display()));
                    continue;
                }
            };

            let rewrite = edit(&content);
            outcome.warnings.extend(
                rewrite
                    .warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", descriptor.display())),
            );
            let Some(updated) = rewrite.content else {
                continue;
            };

            match write_atomic(descriptor, &updated) {
                Ok(()) => {
                    log::debug!(target: self.context.target(), "Rewrote {}", descriptor.display());
                    outcome.rewritten.push(descriptor.to_path_buf());
                }
                Err(e) => outcome.warnings.push(e.to_string()),
            }
        }
    }
}
