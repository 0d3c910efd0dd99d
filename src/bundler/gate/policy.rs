//! Capability-to-directive mapping.

use super::{Capability, CapabilitySet};
use crate::bundler::settings::{BundleType, Settings};
use serde::Serialize;

/// Launcher config file format accepted by the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Ini,
    Prop,
}

impl ConfigFormat {
    /// Value of the `launcher-cfg-format` bundler parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            ConfigFormat::Ini => "ini",
            ConfigFormat::Prop => "prop",
        }
    }
}

/// Shape of the caller's request that influences corrections.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// A runtime is embedded in the native bundle
    pub embed_runtime: bool,
    /// Jars are signed before bundling
    pub sign_jars: bool,
    /// Requested bundle types
    pub bundle_types: Vec<BundleType>,
    /// Primary launcher name followed by secondary launcher names
    pub launcher_names: Vec<String>,
}

impl RequestOptions {
    /// Derives the options from session settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let bundle = settings.bundle();
        Self {
            embed_runtime: bundle.embeds_runtime(),
            sign_jars: settings.signing().is_some(),
            bundle_types: bundle.types.clone(),
            launcher_names: bundle.launcher_names(),
        }
    }

    /// Whether web deployment descriptors were explicitly requested.
    pub fn requests_web_descriptors(&self) -> bool {
        self.bundle_types
            .iter()
            .any(|t| matches!(t, BundleType::Jnlp | BundleType::All))
    }

    fn has_secondary_launchers(&self) -> bool {
        self.launcher_names.len() > 1
    }
}

/// Concrete directives for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    /// Config file format forced onto the toolchain
    pub config_format: Option<ConfigFormat>,
    /// Rewrite stale `size` attributes in web descriptors
    pub recompute_jnlp_sizes: bool,
    /// Replace backslashes inside descriptor `href` values
    pub normalize_jnlp_paths: bool,
    /// Rename launcher configs whose names contain a dot
    pub rename_launcher_configs: bool,
    /// Delete web descriptors nobody asked for
    pub remove_unrequested_descriptors: bool,
    /// Situations the session should warn about
    pub notes: Vec<String>,
}

/// Maps observed capabilities and request shape to directives. Performs no I/O.
pub fn decide_policy(capabilities: &CapabilitySet, options: &RequestOptions) -> PolicyDecision {
    let mut decision = PolicyDecision::default();
    let web_possible =
        options.requests_web_descriptors() || capabilities.has(Capability::JnlpBundler);

    if options.embed_runtime && capabilities.has(Capability::DefaultCfgBreaksWithRuntime) {
        if capabilities.has(Capability::LauncherCfgFormat) {
            decision.config_format = Some(ConfigFormat::Prop);
        } else {
            decision.notes.push(
                "default launcher config format is known to break with an embedded runtime, \
                 and this toolchain cannot be told to use another format"
                    .to_string(),
            );
        }
    }

    decision.recompute_jnlp_sizes = options.sign_jars && web_possible;
    decision.normalize_jnlp_paths =
        web_possible && capabilities.has(Capability::HostBackslashSeparators);
    decision.rename_launcher_configs = capabilities.has(Capability::CfgNameTruncatedAtFirstDot)
        && options.launcher_names.iter().any(|n| n.contains('.'));
    decision.remove_unrequested_descriptors =
        !options.requests_web_descriptors() && capabilities.has(Capability::JnlpBundler);

    if options.has_secondary_launchers() && !capabilities.has(Capability::SecondaryLaunchers) {
        decision
            .notes
            .push("secondary launchers were requested but the toolchain does not support them".to_string());
    }

    decision
}
