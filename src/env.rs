//! Environment variables as a configuration source.
//!
//! `{PREFIX}__LOG__LEVEL=debug` lands at `log/level`: `__` separates
//! segments, a single `_` stays part of the segment, and segments are
//! lowercased. A variable naming a node that other variables put children
//! under (`TT__LOG` next to `TT__LOG__LEVEL`) keeps both: the node becomes a
//! branch holding its own value, whatever order the variables arrive in.

use toml::Value;

use crate::collect::Collector;
use crate::error::CollectorError;
use crate::node::Node;
use crate::path::KeyPath;

const SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
pub struct EnvCollector {
    prefix: String,
    vars: Option<Vec<(String, String)>>,
}

impl EnvCollector {
    /// Read from the process environment at collection time.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            vars: None,
        }
    }

    /// Read from `vars` instead of the process environment.
    pub fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: prefix.to_string(),
            vars: Some(vars.into_iter().collect()),
        }
    }

    /// Strip the prefix and split the rest into lowercased segments.
    /// `None` for variables that don't belong to this collector.
    fn key_path(&self, name: &str) -> Option<KeyPath> {
        let rest = name.strip_prefix(&self.prefix)?.strip_prefix(SEPARATOR)?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.split(SEPARATOR).map(str::to_lowercase).collect())
    }
}

impl Collector for EnvCollector {
    fn name(&self) -> &str {
        "env"
    }

    fn collect(&self) -> Result<Node, CollectorError> {
        let mut entries: Vec<(KeyPath, String)> = match &self.vars {
            Some(vars) => vars
                .iter()
                .filter_map(|(k, v)| Some((self.key_path(k)?, v.clone())))
                .collect(),
            None => std::env::vars()
                .filter_map(|(k, v)| Some((self.key_path(&k)?, v)))
                .collect(),
        };
        // names differing only in case collapse onto one path; sorting makes
        // the survivor independent of environment order
        entries.sort();

        let mut root = Node::branch().with_source(self.name());
        for (path, raw) in entries {
            let value = parse_env_value(&raw);
            if let Some(existing) = root.get_mut(&path) {
                existing.set_value(value);
                continue;
            }
            root.set(&path, Node::leaf(value).with_source(self.name()));
        }
        Ok(root)
    }
}

/// Typed value for a raw variable: bool, then integer, then float (only
/// with a `.`, so `inf` and `NaN` stay strings), then string.
fn parse_env_value(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    match raw.contains('.').then(|| raw.parse::<f64>()) {
        Some(Ok(f)) => Value::Float(f),
        _ => Value::String(raw.to_string()),
    }
}
