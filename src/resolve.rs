//! Inheritance resolution: fold hierarchy layers into one effective tree.
//!
//! Operates on already matched layers with no lookups of its own. Steps:
//!
//! 1. Seed an empty tree with the hierarchy defaults (lowest priority)
//! 2. Walk the layers from the root to the leaf level
//! 3. For every non-structural key of a layer, consult the exclusion rules
//! 4. Merge what survives through the merge engine (deeper levels win under
//!    `replace`)
//!
//! Exclusions stop a key from flowing *down*: at the leaf level every key is
//! kept, since that is where it was explicitly set.

use tracing::trace;

use crate::builder::HierarchyConfig;
use crate::defaults;
use crate::merge::merge_key;
use crate::node::Node;
use crate::path::KeyPath;

/// Merge `layers` (root first) into a freshly built effective tree.
///
/// The last entry of `layers` is the leaf level. Absent layers are skipped.
/// Nothing in `layers` is modified; the result shares no node with them.
pub fn resolve_effective(layers: &[Option<&Node>], config: &HierarchyConfig) -> Node {
    let mut result = Node::branch();
    defaults::materialize(&mut result, config.defaults());

    let leaf_level = layers.len().saturating_sub(1);
    for (level, layer) in layers.iter().enumerate() {
        let Some(layer) = layer else {
            continue;
        };
        let is_leaf = level == leaf_level;

        for (key, child) in layer.children() {
            if config.is_structural(key) {
                continue;
            }
            let path = KeyPath::from([key]);

            if !is_leaf && config.is_excluded(&path, level) {
                trace!(key, level, "excluded from inheritance");
                continue;
            }

            if !is_leaf && config.exclusions_below(&path, level).next().is_some() {
                let pruned = prune(child, &path, level, config);
                trace!(key, level, "merging with excluded descendants pruned");
                merge_key(&mut result, key, &pruned, config);
                continue;
            }

            trace!(key, level, "merging");
            merge_key(&mut result, key, child, config);
        }
    }
    result
}

/// Copy `node` (found at `path`) without the descendants excluded at `level`.
fn prune(node: &Node, path: &KeyPath, level: usize, config: &HierarchyConfig) -> Node {
    let mut pruned = node.clone();
    let excluded: Vec<KeyPath> = config.exclusions_below(path, level).cloned().collect();
    for prefix in excluded {
        let relative: KeyPath = prefix.segments()[path.len()..].to_vec().into();
        pruned.remove(&relative);
    }
    pruned
}
