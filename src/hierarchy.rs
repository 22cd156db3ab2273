//! Locate the chain of level nodes a target path descends from.
//!
//! A target for a hierarchy `[GLOBAL, k1, k2, ...]` has the shape
//! `k1/name1/k2/name2/...`: one structural key and one name per non-root
//! level. Matching walks the tree two segments at a time and records the node
//! found at each level.

use tracing::debug;

use crate::node::Node;
use crate::path::KeyPath;

/// One entry per level: entry 0 is the root, deeper entries are `None` where
/// the tree has no node for that level yet.
pub type Layers<'a> = Vec<Option<&'a Node>>;

/// Match `target` against `levels` within `root`.
///
/// Returns `None` when the target does not have the shape the levels declare:
/// wrong length, or a structural segment that names the wrong level. A named
/// child missing from the tree is not a mismatch: that level and all deeper
/// ones come back as `None`.
pub fn match_hierarchy<'a>(
    root: &'a Node,
    levels: &[String],
    target: &KeyPath,
) -> Option<Layers<'a>> {
    let expected = levels.len().saturating_sub(1) * 2;
    if levels.is_empty() || target.len() != expected {
        debug!(
            path = %target,
            expected,
            actual = target.len(),
            "target length does not fit hierarchy"
        );
        return None;
    }

    let mut layers = Vec::with_capacity(levels.len());
    layers.push(Some(root));

    let mut current = Some(root);
    for (level, pair) in levels[1..].iter().zip(target.segments().chunks(2)) {
        let [key, name] = pair else {
            return None;
        };
        if key != level {
            debug!(path = %target, expected = %level, found = %key, "structural key mismatch");
            return None;
        }
        current = current
            .and_then(|node| node.child(key))
            .and_then(|node| node.child(name));
        layers.push(current);
    }

    debug!(
        path = %target,
        present = layers.iter().filter(|l| l.is_some()).count(),
        levels = levels.len(),
        "matched hierarchy"
    );
    Some(layers)
}
