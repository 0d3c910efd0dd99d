//! Per-session logging handle.
//!
//! The packaging toolchain keeps one logger for the whole process. Here the
//! equivalent is an explicit [`SessionContext`] created by the session and
//! passed to the binder, facade and corrector, so nothing reaches for a global.

use std::sync::Arc;

/// Log target prefix shared by every session.
const TARGET_PREFIX: &str = "kodegen_bundler_jfx::session";

/// Logging and verbosity handle owned by one packaging session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    target: Arc<str>,
    verbose: bool,
}

impl SessionContext {
    /// Creates a context whose log records are tagged with `label`.
    pub fn new(label: &str, verbose: bool) -> Self {
        let target = if label.is_empty() {
            TARGET_PREFIX.to_string()
        } else {
            format!("{TARGET_PREFIX}::{label}")
        };
        Self {
            target: target.into(),
            verbose,
        }
    }

    /// Log target for records emitted on behalf of this session.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the toolchain should be asked for verbose output.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Relays captured toolchain output line by line.
    pub fn relay_tool_output(&self, symbol: &str, stdout: &str, stderr: &str) {
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!(target: self.target(), "[{symbol}] {line}");
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!(target: self.target(), "[{symbol}] stderr: {line}");
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new("", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_includes_label() {
        let ctx = SessionContext::new("MyApp", true);
        assert_eq!(ctx.target(), "kodegen_bundler_jfx::session::MyApp");
        assert!(ctx.verbose());
        assert_eq!(SessionContext::default().target(), TARGET_PREFIX);
    }
}
