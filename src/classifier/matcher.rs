//! Prefix matching of request paths.
//!
//! # Design Decisions
//! - Paths are compared without their leading `/`
//! - Plain string prefix match, no hostname parsing: `api.twelvedata.com`
//!   also matches `api.twelvedata.com.example.net`
//! - Case-sensitive
//! - First match wins (configuration order)

/// Remove a single leading path separator.
pub fn strip_separator(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Matches request paths against an ordered list of prefixes.
#[derive(Debug, Clone)]
pub struct PrefixMatcher<T> {
    entries: Vec<(String, T)>,
}

impl<T> PrefixMatcher<T> {
    /// Create a matcher from `(prefix, value)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Value attached to the first prefix the path starts with.
    pub fn find(&self, path: &str) -> Option<&T> {
        let path = strip_separator(path);
        self.entries
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, value)| value)
    }

    /// Returns true if any prefix matches.
    pub fn matches(&self, path: &str) -> bool {
        self.find(path).is_some()
    }
}
