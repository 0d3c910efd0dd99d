//! Toolchain version strings.
//!
//! SDK archives report their version in several shapes (`1.8.0_60`,
//! `8u60`, `8.0.60`, `9.0.4+11`). All are normalised to a [`Version`] whose
//! major component is the feature release and whose patch is the update.

use semver::Version;

/// First update release that ships launcher config files.
pub const FIRST_CFG_RELEASE: Version = Version::new(8, 0, 60);

/// First release with the corrected default config format.
pub const CFG_FORMAT_FIXED_RELEASE: Version = Version::new(9, 0, 0);

/// Parses a toolchain version string.
pub fn parse_toolchain_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();

    // Legacy `1.<major>.<minor>_<update>` naming
    if let Some(rest) = raw.strip_prefix("1.") {
        if let Some((head, update)) = rest.split_once('_') {
            let mut parts = head.split('.');
            let major = leading_number(parts.next()?)?;
            let minor = parts.next().and_then(leading_number).unwrap_or(0);
            return Some(Version::new(major, minor, leading_number(update)?));
        }
    }

    // `8u60`
    if let Some((major, update)) = raw.split_once('u') {
        if let (Some(major), Some(update)) = (leading_number(major), leading_number(update)) {
            if major.to_string() == major_digits(raw) {
                return Some(Version::new(major, 0, update));
            }
        }
    }

    let numeric: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric.split('.').filter(|p| !p.is_empty());
    let major = leading_number(parts.next()?)?;
    let minor = parts.next().and_then(leading_number).unwrap_or(0);
    let patch = parts.next().and_then(leading_number).unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

fn major_digits(raw: &str) -> String {
    raw.chars().take_while(|c| c.is_ascii_digit()).collect()
}

fn leading_number(s: &str) -> Option<u64> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
