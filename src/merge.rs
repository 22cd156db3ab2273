//! Strategy-aware merging of one subtree into a result tree.
//!
//! Strategies are looked up by serialized key path (`credentials/users`). A
//! key with no registered descendants is merged in one step with its own
//! strategy. A key that has registered descendants is walked child by child:
//! each child inherits its parent's strategy unless it has one of its own.

use toml::Value;
use tracing::{trace, warn};

use crate::builder::HierarchyConfig;
use crate::node::Node;
use crate::path::DEFAULT_DELIMITER;
use crate::types::MergeStrategy;

/// Merge `incoming` into `result`'s child `key`, resolving strategies from
/// `config`. Keys without a registered strategy are replaced.
pub fn merge_key(result: &mut Node, key: &str, incoming: &Node, config: &HierarchyConfig) {
    merge_at(result, key, key, incoming, MergeStrategy::default(), config);
}

fn merge_at(
    parent: &mut Node,
    name: &str,
    key_path: &str,
    incoming: &Node,
    inherited: MergeStrategy,
    config: &HierarchyConfig,
) {
    let strategy = config.strategy(key_path).unwrap_or(inherited);

    if !config.has_descendant_strategy(key_path) {
        trace!(key = key_path, %strategy, "merging subtree");
        apply(parent, name, incoming, strategy);
        return;
    }

    let both_branches = incoming.is_branch() && parent.child(name).is_some_and(Node::is_branch);
    if !both_branches {
        trace!(key = key_path, %strategy, "not a branch on both sides, merging directly");
        apply(parent, name, incoming, strategy);
        return;
    }

    let Some(existing) = parent.child_mut(name) else {
        return;
    };
    for (child_name, child) in incoming.children() {
        let child_path = format!("{key_path}{DEFAULT_DELIMITER}{child_name}");
        merge_at(existing, child_name, &child_path, child, strategy, config);
    }
}

/// Apply `strategy` to a single key, falling back to replace when the shapes
/// on both sides don't allow it.
pub fn apply(parent: &mut Node, name: &str, incoming: &Node, strategy: MergeStrategy) {
    let merged = match strategy {
        MergeStrategy::Replace => false,
        MergeStrategy::Append => parent
            .child_mut(name)
            .is_some_and(|existing| append(existing, incoming)),
        MergeStrategy::Deep => parent
            .child_mut(name)
            .filter(|existing| existing.is_branch() && incoming.is_branch())
            .map(|existing| deep_merge(existing, incoming))
            .is_some(),
    };
    if !merged {
        parent.set_child(name, incoming.clone());
    }
}

/// Deep-merge `overlay` into `base`.
///
/// Branches on both sides recurse; anything else is taken from `overlay`.
/// Children only `base` has are left alone. A value `overlay` holds next to
/// its children replaces the one `base` holds.
pub fn deep_merge(base: &mut Node, overlay: &Node) {
    if overlay.is_branch()
        && let Some(value) = overlay.value()
    {
        base.set_value(value.clone());
    }
    for (name, child) in overlay.children() {
        let both_branches = child.is_branch() && base.child(name).is_some_and(Node::is_branch);
        if !both_branches {
            base.set_child(name, child.clone());
        } else if let Some(existing) = base.child_mut(name) {
            deep_merge(existing, child);
        }
    }
}

/// Shape of an array's elements.
#[derive(Debug, PartialEq)]
enum Elements {
    Empty,
    Uniform(&'static str),
    Mixed,
}

fn elements(items: &[Value]) -> Elements {
    let Some(first) = items.first() else {
        return Elements::Empty;
    };
    let kind = first.type_str();
    if items.iter().all(|v| v.type_str() == kind) {
        Elements::Uniform(kind)
    } else {
        Elements::Mixed
    }
}

/// Append `incoming`'s array after `existing`'s, in place. Returns `false`
/// (leaving `existing` untouched) unless both are leaves holding arrays with
/// one shared element type.
fn append(existing: &mut Node, incoming: &Node) -> bool {
    if !existing.is_leaf() || !incoming.is_leaf() {
        return false;
    }
    let (Some(Value::Array(dst)), Some(Value::Array(src))) =
        (existing.value_mut(), incoming.value())
    else {
        return false;
    };

    let compatible = match (elements(dst), elements(src)) {
        (Elements::Mixed, _) | (_, Elements::Mixed) => false,
        (Elements::Uniform(a), Elements::Uniform(b)) => a == b,
        _ => true,
    };
    if !compatible {
        warn!("array element types differ, append falls back to replace");
        return false;
    }

    dst.extend(src.iter().cloned());
    true
}
