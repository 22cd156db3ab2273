//! Segment paths addressing locations in a configuration tree.
//!
//! A [`KeyPath`] is an ordered list of string segments. Empty segments are
//! real values: parsing `"/a"` yields `["", "a"]`, never `["a"]`. The textual
//! form joins segments with a delimiter, `/` unless told otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pattern;

/// Delimiter used by [`Display`](fmt::Display), [`FromStr`] and strategy keys.
pub const DEFAULT_DELIMITER: &str = "/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The zero-length path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split `s` on `delimiter`, keeping empty segments.
    ///
    /// The empty string is the zero-length path, not a path holding one empty
    /// segment.
    pub fn parse(s: &str, delimiter: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Self(s.split(delimiter).map(str::to_string).collect())
    }

    /// Inverse of [`parse`](Self::parse) for non-empty paths.
    pub fn join(&self, delimiter: &str) -> String {
        self.0.join(delimiter)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All but the last segment. `None` for paths of length 0 or 1.
    pub fn parent(&self) -> Option<KeyPath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The last segment, or `""` for the zero-length path.
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// A new path with `segments` appended; `self` is left as is.
    pub fn append<I, S>(&self, segments: I) -> KeyPath
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = self.0.clone();
        out.extend(segments.into_iter().map(Into::into));
        Self(out)
    }

    /// Shorthand for appending a single segment.
    pub fn child(&self, segment: &str) -> KeyPath {
        self.append([segment])
    }

    pub fn has_empty_segment(&self) -> bool {
        self.0.iter().any(String::is_empty)
    }

    /// Literal segment-wise prefix test. The empty path is a prefix of everything.
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Match this path against a glob-like `pattern`.
    ///
    /// See [`pattern::matches`] for the rules.
    pub fn matches(&self, pattern: &KeyPath) -> bool {
        pattern::matches(&self.0, &pattern.0)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(DEFAULT_DELIMITER))
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_DELIMITER))
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self::parse(s, DEFAULT_DELIMITER)
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        Self::parse(&s, DEFAULT_DELIMITER)
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for KeyPath {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
