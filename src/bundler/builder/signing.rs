//! Signing credential resolution.
//!
//! Passwords can stay out of configuration files: when set, the
//! `JFX_STORE_PASSWORD` and `JFX_KEY_PASSWORD` environment variables replace
//! the configured values. Nothing here validates them; the facade rejects
//! empty credentials.

use crate::bundler::SigningSettings;

/// Environment variable holding the keystore password.
pub const STORE_PASSWORD_ENV: &str = "JFX_STORE_PASSWORD";

/// Environment variable holding the key password.
pub const KEY_PASSWORD_ENV: &str = "JFX_KEY_PASSWORD";

/// Applies environment overrides to the configured signing request.
pub fn resolve_signing(configured: Option<&SigningSettings>) -> Option<SigningSettings> {
    resolve_signing_with(configured, |name| std::env::var(name).ok())
}

fn resolve_signing_with(
    configured: Option<&SigningSettings>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SigningSettings> {
    let mut signing = configured?.clone();
    let from_env = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(password) = from_env(STORE_PASSWORD_ENV) {
        log::debug!("Using keystore password from {STORE_PASSWORD_ENV}");
        signing.store_password = password;
    }
    if let Some(password) = from_env(KEY_PASSWORD_ENV) {
        log::debug!("Using key password from {KEY_PASSWORD_ENV}");
        signing.key_password = password;
    }
    Some(signing)
}
