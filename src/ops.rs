//! Resolution facade: effective trees and values for hierarchy targets.
//!
//! [`Resolver`] ties a raw tree to a [`HierarchyConfig`] and turns the
//! matcher's "no match" into errors callers can report.

use std::collections::BTreeMap;

use tracing::debug;

use crate::builder::HierarchyConfig;
use crate::error::TierfigError;
use crate::hierarchy::match_hierarchy;
use crate::node::Node;
use crate::path::KeyPath;
use crate::resolve::resolve_effective;

/// Resolves effective configuration for targets of a raw tree.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Node,
    hierarchy: Option<&'a HierarchyConfig>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Node, hierarchy: &'a HierarchyConfig) -> Self {
        Self {
            root,
            hierarchy: Some(hierarchy),
        }
    }

    /// A resolver over a tree with no declared hierarchy. Every resolution
    /// fails with [`TierfigError::NoInheritance`].
    pub fn flat(root: &'a Node) -> Self {
        Self {
            root,
            hierarchy: None,
        }
    }

    pub fn root(&self) -> &'a Node {
        self.root
    }

    pub fn hierarchy(&self) -> Option<&'a HierarchyConfig> {
        self.hierarchy
    }

    fn config(&self) -> Result<&'a HierarchyConfig, TierfigError> {
        self.hierarchy.ok_or(TierfigError::NoInheritance)
    }

    /// The effective tree for `target`.
    pub fn effective(&self, target: &KeyPath) -> Result<Node, TierfigError> {
        let config = self.config()?;
        let layers = match_hierarchy(self.root, config.levels(), target)
            .ok_or_else(|| TierfigError::HierarchyMismatch(target.to_string()))?;
        Ok(resolve_effective(&layers, config))
    }

    /// Effective trees for every fully specified target present in the raw
    /// tree, keyed by the target's serialized path.
    ///
    /// With only the global level, the single target is the empty path.
    pub fn effective_all(&self) -> Result<BTreeMap<String, Node>, TierfigError> {
        let config = self.config()?;
        let mut targets = Vec::new();
        collect_targets(self.root, &config.levels()[1..], KeyPath::root(), &mut targets);

        let mut result = BTreeMap::new();
        for target in targets {
            let effective = self.effective(&target)?;
            debug!(path = %target, keys = effective.child_names().len(), "resolved target");
            result.insert(target.to_string(), effective);
        }
        Ok(result)
    }

    /// The effective value of the top-level `key` for `target`.
    pub fn get(&self, target: &KeyPath, key: &str) -> Result<Node, TierfigError> {
        let mut effective = self.effective(target)?;
        effective
            .remove_child(key)
            .ok_or_else(|| TierfigError::KeyNotFound(key.to_string()))
    }

    /// The effective node at `path` for `target`.
    pub fn lookup(&self, target: &KeyPath, path: &KeyPath) -> Result<Node, TierfigError> {
        let mut effective = self.effective(target)?;
        if path.is_empty() {
            return Ok(effective);
        }
        effective
            .remove(path)
            .ok_or_else(|| TierfigError::PathNotFound(path.to_string()))
    }
}

/// Push every `level/name/...` path under `node` that reaches the last level.
fn collect_targets(node: &Node, levels: &[String], prefix: KeyPath, out: &mut Vec<KeyPath>) {
    let Some((level, deeper)) = levels.split_first() else {
        out.push(prefix);
        return;
    };
    let Some(container) = node.child(level) else {
        return;
    };
    for (name, child) in container.children() {
        let next = prefix.child(level).child(name);
        collect_targets(child, deeper, next, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{cluster_config, cluster_tree, tree};
    use crate::types::{GLOBAL, MergeStrategy};
    use toml::Value;

    const INSTANCE_A: &str = "groups/storages/replicasets/s-001/instances/s-001-a";
    const INSTANCE_B: &str = "groups/storages/replicasets/s-001/instances/s-001-b";

    #[test]
    fn effective_for_instance() {
        let root = cluster_tree();
        let config = cluster_config().build().unwrap();
        let resolver = Resolver::new(&root, &config);
        let effective = resolver.effective(&KeyPath::from(INSTANCE_A)).unwrap();
        assert_eq!(effective.child("foo").unwrap().value(), Some(&Value::from("bar")));
    }

    #[test]
    fn no_hierarchy_is_no_inheritance() {
        let root = cluster_tree();
        let resolver = Resolver::flat(&root);
        let err = resolver.effective(&KeyPath::from(INSTANCE_A)).unwrap_err();
        assert!(matches!(err, TierfigError::NoInheritance));
        assert!(matches!(
            resolver.effective_all().unwrap_err(),
            TierfigError::NoInheritance
        ));
    }

    #[test]
    fn wrong_shape_is_hierarchy_mismatch() {
        let root = cluster_tree();
        let config = cluster_config().build().unwrap();
        let resolver = Resolver::new(&root, &config);
        for target in ["groups/storages", "zones/a/replicasets/r/instances/i"] {
            match resolver.effective(&KeyPath::from(target)).unwrap_err() {
                TierfigError::HierarchyMismatch(path) => assert_eq!(path, target),
                other => panic!("Expected HierarchyMismatch, got: {other:?}"),
            }
        }
    }

    #[test]
    fn effective_all_lists_every_instance() {
        let root = cluster_tree();
        let config = cluster_config()
            .merge_strategy("roles", MergeStrategy::Append)
            .build()
            .unwrap();
        let all = Resolver::new(&root, &config).effective_all().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), [INSTANCE_A, INSTANCE_B]);
        assert_eq!(
            all[INSTANCE_B].child("roles").unwrap().value(),
            Some(&Value::Array(vec!["storage".into()]))
        );
    }

    #[test]
    fn effective_all_skips_incomplete_branches() {
        let root = tree(
            "[groups.g1.replicasets.r1.instances.i1]\nx = 1\n\
             [groups.g2]\ny = 2\n\
             [groups.g3.replicasets.r3]\nz = 3\n",
        );
        let config = cluster_config().build().unwrap();
        let all = Resolver::new(&root, &config).effective_all().unwrap();
        assert_eq!(
            all.keys().collect::<Vec<_>>(),
            ["groups/g1/replicasets/r1/instances/i1"]
        );
    }

    #[test]
    fn effective_all_global_only() {
        let root = tree("a = 1\n");
        let config = HierarchyConfig::builder().levels([GLOBAL]).build().unwrap();
        let all = Resolver::new(&root, &config).effective_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[""].child("a").is_some());
    }

    #[test]
    fn get_single_key() {
        let root = cluster_tree();
        let config = cluster_config().build().unwrap();
        let resolver = Resolver::new(&root, &config);
        let leader = resolver.get(&KeyPath::from(INSTANCE_B), "leader").unwrap();
        assert_eq!(leader.value(), Some(&Value::from("s-001-a")));

        match resolver.get(&KeyPath::from(INSTANCE_B), "nope").unwrap_err() {
            TierfigError::KeyNotFound(key) => assert_eq!(key, "nope"),
            other => panic!("Expected KeyNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn lookup_nested_path() {
        let root = cluster_tree();
        let config = cluster_config().build().unwrap();
        let resolver = Resolver::new(&root, &config);
        let target = KeyPath::from(INSTANCE_A);

        let level = resolver.lookup(&target, &KeyPath::from("log/level")).unwrap();
        assert_eq!(level.value(), Some(&Value::from("debug")));

        let whole = resolver.lookup(&target, &KeyPath::root()).unwrap();
        assert!(whole.child("foo").is_some());

        match resolver
            .lookup(&target, &KeyPath::from("log/format"))
            .unwrap_err()
        {
            TierfigError::PathNotFound(path) => assert_eq!(path, "log/format"),
            other => panic!("Expected PathNotFound, got: {other:?}"),
        }
    }
}
