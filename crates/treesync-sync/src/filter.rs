//! Substring-based exclusion of tree entries

use serde::{Deserialize, Serialize};

/// Exclusion patterns applied while walking the source tree
///
/// A pattern is a plain substring. An entry is excluded when its bare name or
/// its path relative to the source root contains any pattern. Excluding a
/// directory excludes its whole subtree because the walker never lists it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    /// Create a filter from a list of substrings
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Patterns in the order they were given
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether the filter has no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First pattern matching the entry, if any
    pub fn matching_pattern(&self, name: &str, relative_path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| name.contains(pattern.as_str()) || relative_path.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Check whether an entry is excluded
    pub fn is_excluded(&self, name: &str, relative_path: &str) -> bool {
        self.matching_pattern(name, relative_path).is_some()
    }
}
