use std::collections::{BTreeMap, HashSet};

use toml::Table;

use crate::error::TierfigError;
use crate::path::{DEFAULT_DELIMITER, KeyPath};
use crate::types::{GLOBAL, MergeStrategy};

/// Lowest-priority values, keyed the way a TOML document nests them.
pub type DefaultsType = Table;

/// Declared hierarchy plus the rules that govern inheritance along it.
///
/// Built once through [`HierarchyConfig::builder`] (or loaded with
/// [`HierarchyConfig::from_toml_str`]) and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyConfig {
    levels: Vec<String>,
    defaults: DefaultsType,
    no_inherit: Vec<KeyPath>,
    /// Indexed by level.
    no_inherit_from: Vec<Vec<KeyPath>>,
    strategies: BTreeMap<String, MergeStrategy>,
}

impl HierarchyConfig {
    pub fn builder() -> HierarchyConfigBuilder {
        HierarchyConfigBuilder::new()
    }

    /// Level names, [`GLOBAL`] first.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Whether `key` names a level boundary rather than configuration data.
    pub fn is_structural(&self, key: &str) -> bool {
        self.levels.iter().any(|level| level == key)
    }

    pub fn defaults(&self) -> &DefaultsType {
        &self.defaults
    }

    /// Whether `path`, set at `level`, is kept from flowing to deeper levels.
    ///
    /// Matches when a global or level-specific prefix is a literal
    /// segment-wise prefix of `path`.
    pub fn is_excluded(&self, path: &KeyPath, level: usize) -> bool {
        self.exclusions(level).any(|prefix| path.starts_with(prefix))
    }

    /// Exclusion prefixes that lie strictly below `path` at `level`.
    pub(crate) fn exclusions_below<'a>(
        &'a self,
        path: &'a KeyPath,
        level: usize,
    ) -> impl Iterator<Item = &'a KeyPath> + 'a {
        self.exclusions(level)
            .filter(move |prefix| prefix.len() > path.len() && prefix.starts_with(path))
    }

    fn exclusions(&self, level: usize) -> impl Iterator<Item = &KeyPath> {
        let scoped = self.no_inherit_from.get(level).into_iter().flatten();
        self.no_inherit.iter().chain(scoped)
    }

    /// Strategy registered for the serialized key path `key`.
    pub fn strategy(&self, key: &str) -> Option<MergeStrategy> {
        self.strategies.get(key).copied()
    }

    /// Whether some registered strategy key starts with `key` followed by the
    /// delimiter.
    ///
    /// This is a plain string-prefix test on serialized keys.
    pub fn has_descendant_strategy(&self, key: &str) -> bool {
        let prefix = format!("{key}{DEFAULT_DELIMITER}");
        self.strategies.keys().any(|k| k.starts_with(&prefix))
    }

    pub fn strategies(&self) -> &BTreeMap<String, MergeStrategy> {
        &self.strategies
    }
}

/// Builder for [`HierarchyConfig`].
///
/// Configuration mistakes (unknown level names, a level list that doesn't
/// start with [`GLOBAL`]) surface from [`build`](Self::build), never later
/// during resolution.
#[derive(Debug, Default)]
pub struct HierarchyConfigBuilder {
    levels: Vec<String>,
    defaults: DefaultsType,
    no_inherit: Vec<KeyPath>,
    no_inherit_from: Vec<(String, KeyPath)>,
    strategies: BTreeMap<String, MergeStrategy>,
}

impl HierarchyConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the ordered level names. The first must be [`GLOBAL`].
    pub fn levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = levels.into_iter().map(Into::into).collect();
        self
    }

    /// Lowest-priority values, overridden by anything set at any level.
    pub fn defaults(mut self, defaults: DefaultsType) -> Self {
        self.defaults = defaults;
        self
    }

    /// Keep keys under `prefix` from being inherited, whatever level sets them.
    pub fn no_inherit(mut self, prefix: impl Into<KeyPath>) -> Self {
        self.no_inherit.push(prefix.into());
        self
    }

    /// Keep keys under `prefix` set at `level` from flowing to deeper levels.
    pub fn no_inherit_from(mut self, level: &str, prefix: impl Into<KeyPath>) -> Self {
        self.no_inherit_from.push((level.to_string(), prefix.into()));
        self
    }

    /// Use `strategy` when merging the key at `prefix`.
    pub fn merge_strategy(mut self, prefix: impl Into<KeyPath>, strategy: MergeStrategy) -> Self {
        let key = prefix.into().join(DEFAULT_DELIMITER);
        self.strategies.insert(key, strategy);
        self
    }

    pub fn build(self) -> Result<HierarchyConfig, TierfigError> {
        validate_levels(&self.levels)?;

        let mut no_inherit_from = vec![Vec::new(); self.levels.len()];
        for (level, prefix) in self.no_inherit_from {
            let index = self
                .levels
                .iter()
                .position(|l| *l == level)
                .ok_or_else(|| TierfigError::UnknownLevel {
                    level: level.clone(),
                    available: self.levels.join(", "),
                })?;
            no_inherit_from[index].push(prefix);
        }

        Ok(HierarchyConfig {
            levels: self.levels,
            defaults: self.defaults,
            no_inherit: self.no_inherit,
            no_inherit_from,
            strategies: self.strategies,
        })
    }
}

fn validate_levels(levels: &[String]) -> Result<(), TierfigError> {
    match levels.first() {
        None => {
            return Err(TierfigError::InvalidLevels(format!(
                "no levels declared, expected at least '{GLOBAL}'"
            )));
        }
        Some(first) if first != GLOBAL => {
            return Err(TierfigError::InvalidLevels(format!(
                "first level must be '{GLOBAL}', got '{first}'"
            )));
        }
        Some(_) => {}
    }

    let mut seen = HashSet::new();
    for level in levels {
        if !seen.insert(level.as_str()) {
            return Err(TierfigError::InvalidLevels(format!(
                "level '{level}' declared twice"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> HierarchyConfigBuilder {
        HierarchyConfig::builder().levels([GLOBAL, "groups", "replicasets", "instances"])
    }

    #[test]
    fn builds_with_levels_only() {
        let config = cluster().build().unwrap();
        assert_eq!(config.num_levels(), 4);
        assert!(config.is_structural("groups"));
        assert!(config.is_structural(GLOBAL));
        assert!(!config.is_structural("roles"));
        assert!(config.defaults().is_empty());
    }

    #[test]
    fn missing_levels_rejected() {
        let err = HierarchyConfig::builder().build().unwrap_err();
        assert!(matches!(err, TierfigError::InvalidLevels(_)));
    }

    #[test]
    fn first_level_must_be_global() {
        let err = HierarchyConfig::builder()
            .levels(["groups", "instances"])
            .build()
            .unwrap_err();
        match err {
            TierfigError::InvalidLevels(msg) => assert!(msg.contains("groups")),
            other => panic!("Expected InvalidLevels, got: {other:?}"),
        }
    }

    #[test]
    fn duplicate_level_rejected() {
        let err = HierarchyConfig::builder()
            .levels([GLOBAL, "groups", "groups"])
            .build()
            .unwrap_err();
        assert!(matches!(err, TierfigError::InvalidLevels(_)));
    }

    #[test]
    fn unknown_level_in_no_inherit_from() {
        let err = cluster()
            .no_inherit_from("zones", "snapshot/dir")
            .build()
            .unwrap_err();
        match err {
            TierfigError::UnknownLevel { level, available } => {
                assert_eq!(level, "zones");
                assert!(available.contains("replicasets"));
            }
            other => panic!("Expected UnknownLevel, got: {other:?}"),
        }
    }

    #[test]
    fn global_exclusion_applies_at_every_level() {
        let config = cluster().no_inherit("credentials").build().unwrap();
        for level in 0..4 {
            assert!(config.is_excluded(&KeyPath::from("credentials"), level));
            assert!(config.is_excluded(&KeyPath::from("credentials/users"), level));
        }
        assert!(!config.is_excluded(&KeyPath::from("cred"), 0));
    }

    #[test]
    fn level_exclusion_is_scoped() {
        let config = cluster()
            .no_inherit_from("groups", "replication")
            .build()
            .unwrap();
        assert!(config.is_excluded(&KeyPath::from("replication"), 1));
        assert!(!config.is_excluded(&KeyPath::from("replication"), 0));
        assert!(!config.is_excluded(&KeyPath::from("replication"), 2));
    }

    #[test]
    fn empty_prefix_excludes_everything() {
        let config = cluster().no_inherit("").build().unwrap();
        assert!(config.is_excluded(&KeyPath::from("anything/at/all"), 2));
    }

    #[test]
    fn exclusions_below_a_key() {
        let config = cluster()
            .no_inherit_from(GLOBAL, "snapshot/dir")
            .build()
            .unwrap();
        let snapshot = KeyPath::from("snapshot");
        let below: Vec<_> = config.exclusions_below(&snapshot, 0).collect();
        assert_eq!(below, [&KeyPath::from("snapshot/dir")]);
        assert!(!config.is_excluded(&snapshot, 0));
        assert_eq!(config.exclusions_below(&snapshot, 1).count(), 0);
    }

    #[test]
    fn strategies_keyed_by_serialized_path() {
        let config = cluster()
            .merge_strategy("credentials", MergeStrategy::Deep)
            .merge_strategy(["credentials", "users"], MergeStrategy::Append)
            .build()
            .unwrap();
        assert_eq!(config.strategy("credentials"), Some(MergeStrategy::Deep));
        assert_eq!(
            config.strategy("credentials/users"),
            Some(MergeStrategy::Append)
        );
        assert_eq!(config.strategy("roles"), None);
        assert!(config.has_descendant_strategy("credentials"));
        assert!(!config.has_descendant_strategy("credentials/users"));
    }

    #[test]
    fn descendant_check_is_string_prefix() {
        let config = cluster()
            .merge_strategy("a/b/c", MergeStrategy::Append)
            .build()
            .unwrap();
        assert!(config.has_descendant_strategy("a"));
        assert!(config.has_descendant_strategy("a/b"));
        assert!(!config.has_descendant_strategy("a/b/c"));
        assert!(!config.has_descendant_strategy("a/"));
    }
}
