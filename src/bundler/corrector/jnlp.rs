//! Web deployment descriptor surgery.
//!
//! Descriptors are edited line by line. A line is touched only if it matches
//! the jar reference pattern, and then only inside the captured `href` or
//! `size` value. Everything else, including line endings and bytes that are
//! not valid UTF-8, is copied through unchanged.

use super::tree::{FileSizeIndex, resolve_href};
use regex::bytes::Regex;
use std::sync::LazyLock;

/// `prefix href="..." middle size="..." suffix`, matched against a whole line.
static JAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)^(.*)href=(".*?")(.*)size=(".*?")(.*)$"#)
        .expect("jar reference pattern is valid")
});

/// The five captured parts of a jar reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JarReference<'a> {
    pub prefix: &'a [u8],
    /// `href` value including its quotes
    pub href: &'a [u8],
    pub middle: &'a [u8],
    /// `size` value including its quotes
    pub size: &'a [u8],
    pub suffix: &'a [u8],
}

impl<'a> JarReference<'a> {
    /// `href` value without quotes.
    pub fn href_value(&self) -> &'a [u8] {
        unquote(self.href)
    }

    /// `size` value without quotes.
    pub fn size_value(&self) -> &'a [u8] {
        unquote(self.size)
    }

    /// Reassembles the line with replacement values (given without quotes).
    fn assemble(&self, href: &[u8], size: &[u8]) -> Vec<u8> {
        let mut line = Vec::with_capacity(
            self.prefix.len() + href.len() + self.middle.len() + size.len() + self.suffix.len() + 14,
        );
        line.extend_from_slice(self.prefix);
        line.extend_from_slice(b"href=\"");
        line.extend_from_slice(href);
        line.extend_from_slice(b"\"");
        line.extend_from_slice(self.middle);
        line.extend_from_slice(b"size=\"");
        line.extend_from_slice(size);
        line.extend_from_slice(b"\"");
        line.extend_from_slice(self.suffix);
        line
    }
}

fn unquote(quoted: &[u8]) -> &[u8] {
    &quoted[1..quoted.len() - 1]
}

/// Matches one line (without its terminator) against the jar reference pattern.
pub fn match_jar_reference(line: &[u8]) -> Option<JarReference<'_>> {
    let caps = JAR_REFERENCE.captures(line)?;
    Some(JarReference {
        prefix: caps.get(1)?.as_bytes(),
        href: caps.get(2)?.as_bytes(),
        middle: caps.get(3)?.as_bytes(),
        size: caps.get(4)?.as_bytes(),
        suffix: caps.get(5)?.as_bytes(),
    })
}

/// Lines that look like resources but did not match the pattern.
fn looks_like_resource(line: &[u8]) -> bool {
    let contains = |needle: &[u8]| line.windows(needle.len()).any(|w| w == needle);
    contains(b"<jar") || contains(b"<nativelib")
}

/// Splits `content` into `(body, terminator)` pairs covering every byte.
fn lines(content: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    content.split_inclusive(|b| *b == b'\n').map(|chunk| {
        let cut = if chunk.ends_with(b"\r\n") {
            chunk.len() - 2
        } else if chunk.ends_with(b"\n") {
            chunk.len() - 1
        } else {
            chunk.len()
        };
        chunk.split_at(cut)
    })
}

/// Result of rewriting one descriptor.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// New content, `None` when nothing changed
    pub content: Option<Vec<u8>>,
    pub warnings: Vec<String>,
}

fn rewrite_lines<F>(content: &[u8], mut edit: F) -> Rewrite
where
    F: FnMut(&JarReference<'_>, &mut Vec<String>) -> Option<Vec<u8>>,
{
    let mut out = Vec::with_capacity(content.len());
    let mut changed = false;
    let mut warnings = Vec::new();

    for (body, terminator) in lines(content) {
        let replacement = match match_jar_reference(body) {
            Some(reference) => edit(&reference, &mut warnings),
            None => {
                if looks_like_resource(body) {
                    log::debug!(
                        "Skipping unmatched resource line: {}",
                        String::from_utf8_lossy(body).trim()
                    );
                }
                None
            }
        };
        match replacement {
            Some(line) if line != body => {
                changed = true;
                out.extend_from_slice(&line);
            }
            _ => out.extend_from_slice(body),
        }
        out.extend_from_slice(terminator);
    }

    Rewrite {
        content: changed.then_some(out),
        warnings,
    }
}

/// Rewrites every `size` value that disagrees with the referenced file's
/// current length. References to files outside the index are left alone.
pub fn recompute_sizes(content: &[u8], index: &FileSizeIndex) -> Rewrite {
    rewrite_lines(content, |reference, warnings| {
        let href = String::from_utf8_lossy(reference.href_value());
        let relative = resolve_href(&href)?;
        let Some(actual) = index.size_of(&relative) else {
            warnings.push(format!("referenced jar {href} not found in artifact tree"));
            return None;
        };
        let actual = actual.to_string();
        if reference.size_value() == actual.as_bytes() {
            return None;
        }
        Some(reference.assemble(reference.href_value(), actual.as_bytes()))
    })
}

/// Replaces backslashes with forward slashes inside `href` values only.
pub fn normalize_paths(content: &[u8]) -> Rewrite {
    rewrite_lines(content, |reference, _| {
        let href = reference.href_value();
        if !href.contains(&b'\\') {
            return None;
        }
        let fixed: Vec<u8> = href
            .iter()
            .map(|b| if *b == b'\\' { b'/' } else { *b })
            .collect();
        Some(reference.assemble(&fixed, reference.size_value()))
    })
}
