//! Strict loading of a [`HierarchyConfig`] from a TOML document.
//!
//! Uses `serde_ignored` to deserialize into [`HierarchyFile`] and capture any
//! keys it doesn't consume. Reports each unknown key with its file path and
//! best-effort line number. Anything under `[defaults]` is free-form.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use toml::Table;

use crate::builder::HierarchyConfig;
use crate::error::TierfigError;
use crate::types::{GLOBAL, MergeStrategy};

/// On-disk shape of a hierarchy declaration.
///
/// ```toml
/// levels = ["groups", "replicasets", "instances"]
/// no_inherit = ["credentials"]
///
/// [no_inherit_from]
/// "__global__" = ["snapshot/dir"]
///
/// [merge]
/// roles = "append"
///
/// [defaults]
/// log = { level = "info" }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HierarchyFile {
    /// Level names below the global level, which is implied.
    pub levels: Vec<String>,
    pub defaults: Table,
    pub no_inherit: Vec<String>,
    pub no_inherit_from: BTreeMap<String, Vec<String>>,
    pub merge: BTreeMap<String, MergeStrategy>,
}

impl HierarchyFile {
    pub fn into_config(self) -> Result<HierarchyConfig, TierfigError> {
        let mut builder = HierarchyConfig::builder()
            .levels(std::iter::once(GLOBAL.to_string()).chain(self.levels))
            .defaults(self.defaults);
        for prefix in self.no_inherit {
            builder = builder.no_inherit(prefix);
        }
        for (level, prefixes) in self.no_inherit_from {
            for prefix in prefixes {
                builder = builder.no_inherit_from(&level, prefix);
            }
        }
        for (prefix, strategy) in self.merge {
            builder = builder.merge_strategy(prefix, strategy);
        }
        builder.build()
    }
}

impl HierarchyConfig {
    /// Parse a hierarchy declaration, rejecting unknown keys.
    ///
    /// `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, TierfigError> {
        parse_strict(content, path)?.into_config()
    }

    /// Read and parse a hierarchy declaration from `path`.
    pub fn from_file(path: &Path) -> Result<Self, TierfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| TierfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content, path)
    }
}

/// Deserialize `content`, failing with every key `HierarchyFile` doesn't know.
pub fn parse_strict(content: &str, path: &Path) -> Result<HierarchyFile, TierfigError> {
    let mut unknown_keys: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let file: HierarchyFile = serde_ignored::deserialize(deserializer, |ignored_path| {
        unknown_keys.push(ignored_path.to_string());
    })
    .map_err(|e| TierfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if unknown_keys.is_empty() {
        return Ok(file);
    }

    let errors: Vec<TierfigError> = unknown_keys
        .into_iter()
        .map(|key| {
            let line = find_key_line(content, &key);
            TierfigError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect();

    Err(TierfigError::UnknownKeys(errors))
}

/// 1-based line where `dotted_key` is defined in `content`, or 0.
///
/// A key is found either as a `[table]` header naming it in full or as an
/// assignment of its last segment inside the table named by the rest.
/// Quoted and dotted keys are not recognized.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let wanted: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, table)) = wanted.split_last() else {
        return 0;
    };

    let mut current: Vec<&str> = Vec::new();
    for (number, line) in (1..).zip(content.lines()) {
        let line = line.trim();
        if let Some(header) = table_header(line) {
            current = header.split('.').map(str::trim).collect();
            if current == wanted {
                return number;
            }
        } else if current == table && assigned_key(line) == Some(*leaf) {
            return number;
        }
    }
    0
}

/// Name inside `[name]` or `[[name]]`.
fn table_header(line: &str) -> Option<&str> {
    if !line.starts_with('[') {
        return None;
    }
    let (name, _) = line.trim_start_matches('[').split_once(']')?;
    Some(name.trim())
}

fn assigned_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once('=')?;
    Some(key.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::KeyPath;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("/etc/cluster/hierarchy.toml")
    }

    const FULL: &str = r#"
levels = ["groups", "replicasets", "instances"]
no_inherit = ["credentials"]

[no_inherit_from]
"__global__" = ["snapshot/dir"]
groups = ["replication"]

[merge]
roles = "append"
"credentials/users" = "deep"

[defaults]
log = { level = "info" }
"#;

    #[test]
    fn full_document_builds_config() {
        let config = HierarchyConfig::from_toml_str(FULL, &path()).unwrap();
        assert_eq!(
            config.levels(),
            [GLOBAL, "groups", "replicasets", "instances"]
        );
        assert!(config.is_excluded(&KeyPath::from("credentials/users"), 2));
        assert!(config.is_excluded(&KeyPath::from("snapshot/dir"), 0));
        assert!(!config.is_excluded(&KeyPath::from("snapshot/dir"), 1));
        assert!(config.is_excluded(&KeyPath::from("replication"), 1));
        assert_eq!(config.strategy("roles"), Some(MergeStrategy::Append));
        assert_eq!(
            config.strategy("credentials/users"),
            Some(MergeStrategy::Deep)
        );
        assert_eq!(config.defaults()["log"]["level"].as_str(), Some("info"));
    }

    #[test]
    fn empty_document_is_global_only() {
        let config = HierarchyConfig::from_toml_str("", &path()).unwrap();
        assert_eq!(config.levels(), [GLOBAL]);
    }

    #[test]
    fn unknown_top_level_key() {
        let content = "levels = [\"groups\"]\nlevles = 42\n";
        let err = HierarchyConfig::from_toml_str(content, &path()).unwrap_err();
        match err {
            TierfigError::UnknownKeys(keys) => {
                assert_eq!(keys.len(), 1);
                match &keys[0] {
                    TierfigError::UnknownKey { key, line, .. } => {
                        assert_eq!(key, "levles");
                        assert_eq!(*line, 2);
                    }
                    other => panic!("Expected UnknownKey, got: {other:?}"),
                }
            }
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn free_form_defaults_are_not_unknown() {
        let content = "[defaults]\nanything = 1\n[defaults.deep]\nx = true\n";
        assert!(HierarchyConfig::from_toml_str(content, &path()).is_ok());
    }

    #[test]
    fn invalid_strategy_is_a_parse_error() {
        let content = "[merge]\nroles = \"shuffle\"\n";
        let err = HierarchyConfig::from_toml_str(content, &path()).unwrap_err();
        assert!(matches!(err, TierfigError::ParseError { .. }));
    }

    #[test]
    fn unknown_level_in_file() {
        let content = "levels = [\"groups\"]\n[no_inherit_from]\nzones = [\"x\"]\n";
        let err = HierarchyConfig::from_toml_str(content, &path()).unwrap_err();
        assert!(matches!(err, TierfigError::UnknownLevel { .. }));
    }

    fn unknown(content: &str) -> Vec<(String, usize)> {
        match parse_strict(content, &path()).unwrap_err() {
            TierfigError::UnknownKeys(keys) => keys
                .into_iter()
                .map(|k| match k {
                    TierfigError::UnknownKey { key, line, .. } => (key, line),
                    other => panic!("Expected UnknownKey, got: {other:?}"),
                })
                .collect(),
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_table_reported_at_its_header() {
        let content = "levels = []\n\n[merge]\nroles = \"append\"\n\n[bogus]\nx = 1\n";
        assert_eq!(unknown(content), [("bogus".to_string(), 6)]);
    }

    #[test]
    fn unknown_inline_table_and_scalar_at_top_level() {
        let content = "levles = [\"groups\"]\nextra = { a = 1 }\n\n[merge]\nroles = \"append\"\n";
        let mut found = unknown(content);
        found.sort();
        assert_eq!(
            found,
            [("extra".to_string(), 2), ("levles".to_string(), 1)]
        );
    }

    #[test]
    fn key_lines_follow_table_headers() {
        let content = "a = 1\n[merge]\nroles = \"append\"\n[[list]]\nroles = 2\n[x.y]\nz = 1\n";
        assert_eq!(find_key_line(content, "a"), 1);
        assert_eq!(find_key_line(content, "merge"), 2);
        assert_eq!(find_key_line(content, "merge.roles"), 3);
        assert_eq!(find_key_line(content, "list"), 4);
        assert_eq!(find_key_line(content, "x.y"), 6);
        assert_eq!(find_key_line(content, "x.y.z"), 7);
        assert_eq!(find_key_line(content, "roles"), 0);
        assert_eq!(find_key_line(content, "nowhere"), 0);
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hierarchy.toml");
        std::fs::write(&file, FULL).unwrap();
        let config = HierarchyConfig::from_file(&file).unwrap();
        assert_eq!(config.num_levels(), 4);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HierarchyConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        match err {
            TierfigError::IoError { path, .. } => assert!(path.ends_with("nope.toml")),
            other => panic!("Expected IoError, got: {other:?}"),
        }
    }
}
