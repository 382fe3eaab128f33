//! Asset-name pattern matching for ghrab.
//!
//! Release assets are selected by matching their file names against a
//! shell-style wildcard pattern from the configuration:
//!
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]` / `[a-z]` matches one character from the set or range
//!
//! Matching is case-sensitive and covers the whole name: `"app-*"` matches
//! `"app-linux.tar.gz"` but not `"my-app-linux.tar.gz"`. Patterns are applied
//! to bare asset names, never to paths, so `*` crossing a `/` is not a
//! concern in practice.
//!
//! A pattern that fails to compile (for example an unterminated `[` set)
//! degrades to literal string comparison instead of erroring; a typo in a
//! pattern then simply matches nothing rather than failing the whole run.
//!
//! # Examples
//!
//! ```rust
//! use ghrab::pattern::AssetPattern;
//!
//! let pattern = AssetPattern::new("widget-*-linux-x86_64.tar.gz");
//! assert!(pattern.matches("widget-1.2.0-linux-x86_64.tar.gz"));
//! assert!(!pattern.matches("widget-1.2.0-darwin-arm64.tar.gz"));
//! ```

use glob::Pattern;

/// Compiled asset-name pattern.
///
/// Wraps a [`glob::Pattern`] compiled once at construction. Matching is a
/// pure function with no side effects and no failure modes.
#[derive(Debug, Clone)]
pub struct AssetPattern {
    compiled: Option<Pattern>,
    original: String,
}

impl AssetPattern {
    /// Compile a shell-style wildcard pattern.
    ///
    /// Never fails: a pattern the glob engine rejects falls back to literal
    /// comparison against the original pattern string.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let compiled = match Pattern::new(pattern) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::debug!("pattern '{pattern}' is not valid glob ({e}), matching literally");
                None
            }
        };
        Self {
            compiled,
            original: pattern.to_string(),
        }
    }

    /// Check whether an asset name matches the pattern.
    ///
    /// The entire name must match the entire pattern; there is no substring
    /// matching.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match &self.compiled {
            Some(pattern) => pattern.matches(name),
            None => name == self.original,
        }
    }

    /// The original pattern string, for logging and reports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Whether the pattern contains any wildcard metacharacters.
    ///
    /// Used to decide between exact-tag lookup and pattern search when the
    /// same syntax is applied to release tags.
    #[must_use]
    pub fn is_wildcard(source: &str) -> bool {
        source.contains(['*', '?', '[', ']'])
    }
}
