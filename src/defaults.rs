//! Hierarchy defaults: build them from path/value pairs and expand them into
//! the leaf nodes that seed every effective tree.

use toml::{Table, Value};

use crate::builder::DefaultsType;
use crate::node::Node;
use crate::path::KeyPath;

/// Source recorded on nodes that come from defaults.
pub const DEFAULTS_SOURCE: &str = "default";

/// Build a [`DefaultsType`] from `(path, value)` pairs.
///
/// `("log/level", Value::String("info"))` becomes `{log = {level = "info"}}`.
/// Later entries win; an entry that needs a table where an earlier entry put a
/// scalar replaces the scalar.
pub fn defaults_from_pairs<K: AsRef<str>>(entries: &[(K, Value)]) -> DefaultsType {
    let mut table = Table::new();
    for (key, value) in entries {
        let path = KeyPath::from(key.as_ref());
        set_nested(&mut table, path.segments(), value.clone());
    }
    table
}

fn set_nested(table: &mut Table, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }
    let entry = table
        .entry(first.clone())
        .or_insert_with(|| Value::Table(Table::new()));
    if !entry.is_table() {
        *entry = Value::Table(Table::new());
    }
    if let Value::Table(sub) = entry {
        set_nested(sub, rest, value);
    }
}

/// Write every default into `result`, one leaf per path.
///
/// Empty tables become empty branches so the key still shows up.
pub fn materialize(result: &mut Node, defaults: &DefaultsType) {
    materialize_at(result, &KeyPath::root(), defaults);
}

fn materialize_at(result: &mut Node, prefix: &KeyPath, table: &Table) {
    for (key, value) in table {
        let path = prefix.child(key);
        match value {
            Value::Table(sub) if !sub.is_empty() => materialize_at(result, &path, sub),
            Value::Table(_) => result.set(&path, Node::branch().with_source(DEFAULTS_SOURCE)),
            other => result.set(&path, Node::leaf(other.clone()).with_source(DEFAULTS_SOURCE)),
        }
    }
}
