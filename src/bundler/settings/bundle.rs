//! Distribution bundle request.

use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::PathBuf,
    str::FromStr,
};

/// Bundle type passed to the toolchain's `-native` selector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    /// Every bundle the host supports
    All,
    /// Self-contained application directory
    #[default]
    Image,
    /// Every installer the host supports
    Installer,
    /// Web deployment descriptor
    Jnlp,
    Deb,
    Rpm,
    Dmg,
    Pkg,
    Exe,
    Msi,
}

impl BundleType {
    /// Every selector, in declaration order.
    pub const ALL: [BundleType; 10] = [
        BundleType::All,
        BundleType::Image,
        BundleType::Installer,
        BundleType::Jnlp,
        BundleType::Deb,
        BundleType::Rpm,
        BundleType::Dmg,
        BundleType::Pkg,
        BundleType::Exe,
        BundleType::Msi,
    ];

    /// Selector value understood by the toolchain.
    pub fn as_selector(self) -> &'static str {
        match self {
            BundleType::All => "all",
            BundleType::Image => "image",
            BundleType::Installer => "installer",
            BundleType::Jnlp => "jnlp",
            BundleType::Deb => "deb",
            BundleType::Rpm => "rpm",
            BundleType::Dmg => "dmg",
            BundleType::Pkg => "pkg",
            BundleType::Exe => "exe",
            BundleType::Msi => "msi",
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_selector())
    }
}

impl FromStr for BundleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BundleType::ALL
            .into_iter()
            .find(|t| t.as_selector() == wanted)
            .ok_or_else(|| {
                let valid: Vec<_> = BundleType::ALL.iter().map(|t| t.as_selector()).collect();
                format!("Invalid bundle type: {s}. Valid types: {}", valid.join(", "))
            })
    }
}

/// Additional launcher packaged next to the primary one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecondaryLauncher {
    /// Launcher (and config file) name.
    pub name: String,

    /// Main class; defaults to the application's.
    #[serde(default)]
    pub main_class: Option<String>,

    /// Extra JVM options for this launcher.
    #[serde(default)]
    pub jvm_args: Vec<String>,
}

/// Distribution bundle configuration.
///
/// # Configuration
///
/// ```toml
/// [bundle]
/// output_dir = "target/jfx/native"
/// types = ["image", "jnlp"]
/// app_name = "My.App"
/// version = "1.0.0"
/// vendor = "Example Inc."
/// embed_runtime = true
/// jvm_args = ["-Xmx512m"]
///
/// [bundle.jvm_properties]
/// "app.mode" = "production"
///
/// [[bundle.secondary_launchers]]
/// name = "Second.Tool"
/// main_class = "com.example.SecondTool"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleSettings {
    /// Bundling output directory.
    pub output_dir: PathBuf,

    /// Bundle types, processed in order.
    ///
    /// Default: `["image"]`
    #[serde(default = "default_types")]
    pub types: Vec<BundleType>,

    /// Application (and primary launcher) name.
    pub app_name: String,

    /// Application version.
    pub version: String,

    /// Vendor shown by installers.
    ///
    /// Default: None
    #[serde(default)]
    pub vendor: Option<String>,

    /// Embed a Java runtime in native bundles.
    ///
    /// Default: true
    #[serde(default = "default_true")]
    pub embed_runtime: bool,

    /// Runtime to embed instead of the toolchain's own.
    ///
    /// Default: None
    #[serde(default)]
    pub runtime: Option<PathBuf>,

    /// JVM options written to the launcher config.
    #[serde(default)]
    pub jvm_args: Vec<String>,

    /// System properties written to the launcher config.
    #[serde(default)]
    pub jvm_properties: BTreeMap<String, String>,

    /// Additional launchers.
    #[serde(default)]
    pub secondary_launchers: Vec<SecondaryLauncher>,
}

fn default_types() -> Vec<BundleType> {
    vec![BundleType::Image]
}

fn default_true() -> bool {
    true
}

impl BundleSettings {
    /// Whether native bundles carry a runtime.
    pub fn embeds_runtime(&self) -> bool {
        self.embed_runtime
    }

    /// Primary launcher name followed by secondary launcher names.
    pub fn launcher_names(&self) -> Vec<String> {
        std::iter::once(self.app_name.clone())
            .chain(self.secondary_launchers.iter().map(|l| l.name.clone()))
            .collect()
    }
}
