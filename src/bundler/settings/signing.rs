//! Jar signing request.

use serde::Deserialize;
use std::{fmt, path::PathBuf};

/// Keystore reference and credentials for signing jars.
///
/// Values are validated by the facade, not here: an empty alias or password
/// fails signing instead of silently skipping it.
///
/// # Configuration
///
/// ```toml
/// [signing]
/// keystore = "src/main/deploy/keystore.jks"
/// alias = "myalias"
/// store_password = "secret"
/// key_password = "secret"
/// store_type = "jks"
/// ```
#[derive(Clone, Default, Deserialize)]
pub struct SigningSettings {
    /// Keystore file.
    pub keystore: PathBuf,

    /// Key alias.
    #[serde(default)]
    pub alias: String,

    /// Keystore password.
    #[serde(default)]
    pub store_password: String,

    /// Key password.
    #[serde(default)]
    pub key_password: String,

    /// Keystore type.
    ///
    /// Default: "jks"
    #[serde(default = "default_store_type")]
    pub store_type: String,
}

fn default_store_type() -> String {
    "jks".to_string()
}

impl fmt::Debug for SigningSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSettings")
            .field("keystore", &self.keystore)
            .field("alias", &self.alias)
            .field("store_password", &"<redacted>")
            .field("key_password", &"<redacted>")
            .field("store_type", &self.store_type)
            .finish()
    }
}
