//! The configuration tree.
//!
//! A [`Node`] is either a leaf holding a value (scalar or array) or a branch
//! holding named children. Every node also records where it came from: the
//! `source` of the collector that produced it and a `revision` counter.
//!
//! Tables never live inside a leaf: [`Node::from_value`] turns every TOML table
//! into a branch, so the tree shape always mirrors the key structure.
//!
//! # Leaves that gained children
//!
//! Attaching a child to a leaf (through [`Node::set_child`] or [`Node::set`])
//! turns it into a branch that keeps the old value in
//! `NodeKind::Branch { value: Some(..) }`. Both sides survive; nothing is
//! dropped.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use toml::Value;

use crate::path::KeyPath;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Value),
    Branch {
        children: BTreeMap<String, Node>,
        /// Value the node held as a leaf before it gained children.
        value: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    source: String,
    revision: u64,
}

impl Default for Node {
    fn default() -> Self {
        Self::branch()
    }
}

impl Node {
    /// An empty branch with no provenance.
    pub fn branch() -> Self {
        Self {
            kind: NodeKind::Branch {
                children: BTreeMap::new(),
                value: None,
            },
            source: String::new(),
            revision: 0,
        }
    }

    /// A leaf holding `value` as is.
    ///
    /// Use [`from_value`](Self::from_value) when `value` may contain tables.
    pub fn leaf(value: impl Into<Value>) -> Self {
        Self {
            kind: NodeKind::Leaf(value.into()),
            source: String::new(),
            revision: 0,
        }
    }

    /// Build a tree from a TOML value: tables become branches, everything
    /// else a leaf. Every node gets `source`.
    pub fn from_value(value: Value, source: &str) -> Self {
        let kind = match value {
            Value::Table(table) => NodeKind::Branch {
                children: table
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_value(v, source)))
                    .collect(),
                value: None,
            },
            other => NodeKind::Leaf(other),
        };
        Self {
            kind,
            source: source.to_string(),
            revision: 0,
        }
    }

    /// Convenience for [`from_value`](Self::from_value) on a table.
    pub fn from_table(table: toml::Table, source: &str) -> Self {
        Self::from_value(Value::Table(table), source)
    }

    /// Render back to a TOML value. Branches become tables; a legacy branch
    /// value is not representable there and is left out.
    pub fn to_value(&self) -> Value {
        match &self.kind {
            NodeKind::Leaf(v) => v.clone(),
            NodeKind::Branch { children, .. } => Value::Table(
                children
                    .iter()
                    .map(|(k, child)| (k.clone(), child.to_value()))
                    .collect(),
            ),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set `revision` on this node and every descendant.
    pub fn stamp_revision(&mut self, revision: u64) {
        self.revision = revision;
        if let NodeKind::Branch { children, .. } = &mut self.kind {
            for child in children.values_mut() {
                child.stamp_revision(revision);
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    /// The leaf value, or the value a branch kept from its leaf days.
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Leaf(v) => Some(v),
            NodeKind::Branch { value, .. } => value.as_ref(),
        }
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut Value> {
        match &mut self.kind {
            NodeKind::Leaf(v) => Some(v),
            NodeKind::Branch { value, .. } => value.as_mut(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Branch { children, .. } => children.get(name),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match &mut self.kind {
            NodeKind::Branch { children, .. } => children.get_mut(name),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Insert or replace the child `name`.
    ///
    /// On a leaf, the node becomes a branch that keeps its old value.
    pub fn set_child(&mut self, name: impl Into<String>, child: Node) {
        self.children_mut().insert(name.into(), child);
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Node> {
        match &mut self.kind {
            NodeKind::Branch { children, .. } => children.remove(name),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Child names in sorted order; empty for a leaf.
    pub fn child_names(&self) -> Vec<&str> {
        self.children().map(|(name, _)| name).collect()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        let map = match &self.kind {
            NodeKind::Branch { children, .. } => Some(children),
            NodeKind::Leaf(_) => None,
        };
        map.into_iter()
            .flat_map(|children| children.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Set the node's own value. A branch keeps its children and holds
    /// `value` next to them.
    pub fn set_value(&mut self, value: Value) {
        match self.kind {
            NodeKind::Leaf(ref mut old) => *old = value,
            NodeKind::Branch {
                value: ref mut slot,
                ..
            } => *slot = Some(value),
        }
    }

    fn children_mut(&mut self) -> &mut BTreeMap<String, Node> {
        match self.kind {
            NodeKind::Branch {
                ref mut children, ..
            } => children,
            NodeKind::Leaf(ref mut old) => {
                let value = std::mem::replace(old, Value::Boolean(false));
                self.kind = NodeKind::Branch {
                    children: BTreeMap::new(),
                    value: Some(value),
                };
                self.children_mut()
            }
        }
    }

    /// The node at `path` relative to `self`. The zero-length path is `self`.
    pub fn get(&self, path: &KeyPath) -> Option<&Node> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub fn get_mut(&mut self, path: &KeyPath) -> Option<&mut Node> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child_mut(segment))
    }

    /// Place `node` at `path`, creating branches along the way.
    ///
    /// New intermediate branches take `node`'s source. Intermediate leaves
    /// are kept and gain children. Setting the
    /// zero-length path replaces `self`.
    pub fn set(&mut self, path: &KeyPath, node: Node) {
        let Some((last, parents)) = path.segments().split_last() else {
            *self = node;
            return;
        };
        let mut current = self;
        for segment in parents {
            current = current
                .children_mut()
                .entry(segment.clone())
                .or_insert_with(|| Node::branch().with_source(node.source.clone()));
        }
        current.set_child(last.clone(), node);
    }

    /// Remove the node at `path`, returning it.
    pub fn remove(&mut self, path: &KeyPath) -> Option<Node> {
        let (last, parents) = path.segments().split_last()?;
        let parent = parents
            .iter()
            .try_fold(self, |node, segment| node.child_mut(segment))?;
        parent.remove_child(last)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            NodeKind::Leaf(v) => v.serialize(serializer),
            NodeKind::Branch { children, .. } => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (k, child) in children {
                    map.serialize_entry(k, child)?;
                }
                map.end()
            }
        }
    }
}
