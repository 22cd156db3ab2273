//! Lazy, cancellable enumeration of leaf values.
//!
//! [`Walk`] yields `(path, value)` for every value under a starting node,
//! depth first in child-name order. It is finite and not restartable.
//! Cancelling its [`CancelToken`] (from any thread) makes the next call to
//! `next` return `None`; dropping the walk early releases everything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use toml::Value;

use crate::node::Node;
use crate::path::KeyPath;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Walk<'a> {
    stack: Vec<(KeyPath, &'a Node, usize)>,
    max_depth: Option<usize>,
    cancel: CancelToken,
}

impl<'a> Walk<'a> {
    /// Walk everything under `node`, reporting paths as `prefix/...`.
    ///
    /// `max_depth` bounds how many levels below `node` are visited; `None`
    /// means unbounded and `Some(0)` visits `node` alone.
    pub fn new(node: &'a Node, prefix: KeyPath, max_depth: Option<usize>) -> Self {
        Self {
            stack: vec![(prefix, node, 0)],
            max_depth,
            cancel: CancelToken::new(),
        }
    }

    /// Stop when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (KeyPath, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                self.stack.clear();
                return None;
            }
            let (path, node, depth) = self.stack.pop()?;

            let descend = self.max_depth.is_none_or(|max| depth < max);
            if descend {
                // reversed so the smallest name is popped first
                let mut children: Vec<_> = node.children().collect();
                children.reverse();
                for (name, child) in children {
                    self.stack.push((path.child(name), child, depth + 1));
                }
            }

            if let Some(value) = node.value() {
                return Some((path, value));
            }
        }
    }
}

impl Node {
    /// Lazily enumerate every value under `prefix`.
    ///
    /// Returns an empty walk when `prefix` does not exist.
    pub fn walk(&self, prefix: &KeyPath, max_depth: Option<usize>) -> Walk<'_> {
        match self.get(prefix) {
            Some(node) => Walk::new(node, prefix.clone(), max_depth),
            None => Walk {
                stack: Vec::new(),
                max_depth,
                cancel: CancelToken::new(),
            },
        }
    }

    /// Every value whose full path matches `pattern`.
    pub fn select<'a>(
        &'a self,
        pattern: &'a KeyPath,
    ) -> impl Iterator<Item = (KeyPath, &'a Value)> + 'a {
        self.walk(&KeyPath::root(), None)
            .filter(move |(path, _)| path.matches(pattern))
    }
}
