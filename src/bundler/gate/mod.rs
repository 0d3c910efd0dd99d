//! Capability detection for the bound toolchain.
//!
//! [`VersionGate::detect`] tries a fixed table of symbols and reads the
//! archive's version once per session. Absent symbols are recorded as `false`;
//! detection never fails. The resulting [`CapabilitySet`] is passed as data to
//! [`decide_policy`] and to dialect selection.

mod policy;
mod version;

pub use policy::{ConfigFormat, PolicyDecision, RequestOptions, decide_policy};
pub use version::parse_toolchain_version;

use crate::bundler::{
    BindingErrorKind,
    binder::ToolBinder,
    facade::{BundleDialect, BundlerParamDialect, ClassicDialect},
};
use semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use version::{CFG_FORMAT_FIXED_RELEASE, FIRST_CFG_RELEASE};

/// A fact about the bound toolchain or the host it runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// The packager command-line entry point exists
    PackagerEntryPoint,
    /// Web deployment descriptors can be produced
    JnlpBundler,
    /// The launcher config format can be chosen
    LauncherCfgFormat,
    /// Secondary launchers can be declared
    SecondaryLaunchers,
    /// Launcher config files are looked up by the name up to its first dot
    CfgNameTruncatedAtFirstDot,
    /// The default config format breaks when a runtime is embedded
    DefaultCfgBreaksWithRuntime,
    /// Host paths use backslash separators, which leak into descriptors
    HostBackslashSeparators,
}

struct SymbolCheck {
    capability: Capability,
    symbol: &'static str,
}

const SYMBOL_CHECKS: &[SymbolCheck] = &[
    SymbolCheck {
        capability: Capability::PackagerEntryPoint,
        symbol: "com.sun.javafx.tools.packager.Main#main([Ljava/lang/String;)V",
    },
    SymbolCheck {
        capability: Capability::JnlpBundler,
        symbol: "com.oracle.tools.packager.jnlp.JNLPBundler",
    },
    SymbolCheck {
        capability: Capability::LauncherCfgFormat,
        symbol: "com.oracle.tools.packager.StandardBundlerParam#LAUNCHER_CFG_FORMAT",
    },
    SymbolCheck {
        capability: Capability::SecondaryLaunchers,
        symbol: "com.oracle.tools.packager.StandardBundlerParam#SECONDARY_LAUNCHERS",
    },
];

const VERSION_ATTRIBUTES: &[&str] = &["Implementation-Version", "Specification-Version"];

/// Boolean capability flags observed for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    flags: BTreeMap<Capability, bool>,
    toolchain_version: Option<Version>,
}

impl CapabilitySet {
    /// Whether the capability was observed; unknown capabilities are `false`.
    pub fn has(&self, capability: Capability) -> bool {
        self.flags.get(&capability).copied().unwrap_or(false)
    }

    /// Records a flag.
    pub fn set(&mut self, capability: Capability, value: bool) {
        self.flags.insert(capability, value);
    }

    /// Builder form of [`CapabilitySet::set`].
    pub fn with(mut self, capability: Capability, value: bool) -> Self {
        self.set(capability, value);
        self
    }

    /// Version read from the toolchain archive, if any.
    pub fn toolchain_version(&self) -> Option<&Version> {
        self.toolchain_version.as_ref()
    }

    /// All recorded flags in stable order.
    pub fn flags(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.flags.iter().map(|(c, v)| (*c, *v))
    }
}

/// Detects toolchain capabilities and maps them to policy and dialect.
pub struct VersionGate;

impl VersionGate {
    /// Detects what the bound toolchain supports. Never fails.
    pub fn detect(binder: &ToolBinder) -> CapabilitySet {
        let target = binder.context().target();
        let mut set = CapabilitySet::default();

        for check in SYMBOL_CHECKS {
            let present = match binder.resolve_symbol(check.symbol) {
                Ok(_) => true,
                Err(e) if e.kind() == BindingErrorKind::SymbolMissing => false,
                Err(e) => {
                    log::warn!(target: target, "Symbol check for {:?} failed: {e}", check.capability);
                    false
                }
            };
            log::debug!(target: target, "Capability {:?}: {present}", check.capability);
            set.set(check.capability, present);
        }

        set.toolchain_version = VERSION_ATTRIBUTES
            .iter()
            .filter_map(|attr| binder.manifest_attribute(attr))
            .find_map(|raw| parse_toolchain_version(&raw));

        match &set.toolchain_version {
            Some(v) => log::info!(target: target, "Toolchain version {v}"),
            None => log::info!(
                target: target,
                "Toolchain version unknown; assuming known defects are present"
            ),
        }

        let version = set.toolchain_version.clone();
        set.set(
            Capability::CfgNameTruncatedAtFirstDot,
            version.as_ref().is_none_or(|v| *v >= FIRST_CFG_RELEASE),
        );
        set.set(
            Capability::DefaultCfgBreaksWithRuntime,
            version
                .as_ref()
                .is_none_or(|v| *v >= FIRST_CFG_RELEASE && *v < CFG_FORMAT_FIXED_RELEASE),
        );
        set.set(
            Capability::HostBackslashSeparators,
            std::path::MAIN_SEPARATOR == '\\',
        );

        set
    }

    /// See [`decide_policy`].
    pub fn decide_policy(capabilities: &CapabilitySet, options: &RequestOptions) -> PolicyDecision {
        decide_policy(capabilities, options)
    }

    /// Picks the bundling dialect for the bound toolchain.
    pub fn select_dialect(capabilities: &CapabilitySet) -> Box<dyn BundleDialect> {
        if capabilities.has(Capability::LauncherCfgFormat)
            || capabilities.has(Capability::SecondaryLaunchers)
        {
            Box::new(BundlerParamDialect::new(
                capabilities.has(Capability::SecondaryLaunchers),
            ))
        } else {
            Box::new(ClassicDialect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        SessionContext,
        testing::{ClassSpec, RecordingLauncher, write_toolchain},
    };

    const PARAM: &str = "com.oracle.tools.packager.StandardBundlerParam";

    fn binder(dir: &std::path::Path, version: &str, classes: Vec<ClassSpec>) -> ToolBinder {
        let jar = write_toolchain(dir, version, &classes);
        ToolBinder::bind(
            &jar,
            Box::new(RecordingLauncher::default()),
            SessionContext::default(),
        )
        .unwrap()
    }

    #[test]
    fn missing_symbols_become_false_flags() {
        let dir = tempfile::tempdir().unwrap();
        let binder = binder(
            dir.path(),
            "1.8.0_40",
            vec![ClassSpec::entry_point("com.sun.javafx.tools.packager.Main")],
        );

        let caps = VersionGate::detect(&binder);
        assert!(caps.has(Capability::PackagerEntryPoint));
        assert!(!caps.has(Capability::JnlpBundler));
        assert!(!caps.has(Capability::LauncherCfgFormat));
        assert!(!caps.has(Capability::SecondaryLaunchers));
        assert!(!caps.has(Capability::CfgNameTruncatedAtFirstDot));
        assert!(!caps.has(Capability::DefaultCfgBreaksWithRuntime));
        assert_eq!(caps.toolchain_version(), Some(&Version::new(8, 0, 40)));
    }

    #[test]
    fn update_60_toolchain_reports_defects_and_params() {
        let dir = tempfile::tempdir().unwrap();
        let binder = binder(
            dir.path(),
            "8.0.60",
            vec![
                ClassSpec::entry_point("com.sun.javafx.tools.packager.Main"),
                ClassSpec::plain("com.oracle.tools.packager.jnlp.JNLPBundler"),
                ClassSpec::plain(PARAM)
                    .with_field("LAUNCHER_CFG_FORMAT")
                    .with_field("SECONDARY_LAUNCHERS"),
            ],
        );

        let caps = VersionGate::detect(&binder);
        assert!(caps.has(Capability::JnlpBundler));
        assert!(caps.has(Capability::LauncherCfgFormat));
        assert!(caps.has(Capability::SecondaryLaunchers));
        assert!(caps.has(Capability::CfgNameTruncatedAtFirstDot));
        assert!(caps.has(Capability::DefaultCfgBreaksWithRuntime));
        assert_eq!(VersionGate::select_dialect(&caps).name(), "bundler-params");
    }

    #[test]
    fn unknown_version_assumes_defects() {
        let dir = tempfile::tempdir().unwrap();
        let binder = binder(dir.path(), "", Vec::new());

        let caps = VersionGate::detect(&binder);
        assert!(caps.toolchain_version().is_none());
        assert!(!caps.has(Capability::PackagerEntryPoint));
        assert!(caps.has(Capability::CfgNameTruncatedAtFirstDot));
        assert!(caps.has(Capability::DefaultCfgBreaksWithRuntime));
        assert_eq!(VersionGate::select_dialect(&caps).name(), "classic");
    }
}
