use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel naming the root (global) level. Always the first hierarchy level.
pub const GLOBAL: &str = "__global__";

/// How an incoming subtree combines with what the result already holds for
/// the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Incoming value wins outright.
    #[default]
    Replace,
    /// Concatenate two arrays of the same element type.
    Append,
    /// Merge two branches key by key.
    Deep,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStrategy::Replace => "replace",
            MergeStrategy::Append => "append",
            MergeStrategy::Deep => "deep",
        };
        f.write_str(name)
    }
}
