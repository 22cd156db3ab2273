//! Hierarchical configuration resolution. Declare your levels, hand over a
//! tree, and get the effective configuration of any node in it.
//!
//! Tierfig takes one raw configuration tree, where values are set at several
//! levels of a hierarchy (global, then groups, then replicasets, then
//! instances, or whatever your deployment calls them), and computes the
//! *effective* tree for a single target: everything the target inherits from
//! its ancestors, overridden or combined with what it sets itself.
//!
//! ```ignore
//! let config = HierarchyConfig::builder()
//!     .levels([GLOBAL, "groups", "replicasets", "instances"])
//!     .no_inherit_from(GLOBAL, "snapshot/dir")
//!     .merge_strategy("roles", MergeStrategy::Append)
//!     .build()?;
//!
//! let root = collect_all(&[&TextCollector::file("cluster.toml")])?;
//! let effective = Resolver::new(&root, &config)
//!     .effective(&"groups/storages/replicasets/s-001/instances/s-001-a".into())?;
//! ```
//!
//! # Raw tree
//!
//! A raw tree is a [`Node`]: branches with named children, leaves holding a
//! [`toml::Value`]. Every node records its source (which collector produced
//! it) and a revision. Level boundaries live in the tree itself as
//! *structural keys*:
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [groups.storages]
//! roles = ["storage"]
//!
//! [groups.storages.replicasets.s-001.instances.s-001-a]
//! foo = "bar"
//! ```
//!
//! Trees come from [`Collector`]s. [`TextCollector`] reads TOML or JSON,
//! inline or from a file; [`EnvCollector`] maps `PREFIX__LOG__LEVEL=debug` to
//! `log/level`. [`collect_all`] deep-merges several collectors in
//! priority-ascending order (last = highest).
//!
//! # Paths and patterns
//!
//! A [`KeyPath`] is a list of segments, written with `/` as delimiter
//! (`credentials/users/admin`). Patterns are key paths where `*` matches
//! exactly one segment and `**` matches any number of them. A pattern with no
//! `**` also matches every path it is a prefix of, so `log` matches
//! `log/level`. See [`matches`].
//!
//! # Hierarchy
//!
//! A [`HierarchyConfig`] names the levels, [`GLOBAL`] first. A target for
//! levels `[GLOBAL, groups, replicasets, instances]` has the shape
//! `groups/<g>/replicasets/<r>/instances/<i>`. [`match_hierarchy`] walks the
//! raw tree along the target and returns one layer per level; levels the
//! tree doesn't have yet come back as `None` rather than failing, so a brand
//! new instance still inherits from its group.
//!
//! # Inheritance
//!
//! [`resolve_effective`] folds the layers into a fresh tree, root first:
//!
//! ```text
//! Defaults         HierarchyConfig::defaults
//!        ↑ overridden by
//! Global level     top-level keys of the raw tree
//!        ↑ overridden by
//! Each deeper level, down to the target itself
//! ```
//!
//! Structural keys never reach the effective tree. Two rules keep keys from
//! flowing *down*:
//!
//! - **`no_inherit(prefix)`**: keys under `prefix` are not inherited from any
//!   ancestor level.
//! - **`no_inherit_from(level, prefix)`**: keys under `prefix` are not
//!   inherited from that one level.
//!
//! Exclusions never apply at the target's own level. A key the target sets
//! itself is always visible in its effective tree.
//!
//! # Merge strategies
//!
//! How a deeper level combines with what is already there is decided per key
//! path by [`MergeStrategy`]:
//!
//! - **`Replace`** (default): the deeper value wins outright.
//! - **`Append`**: arrays are concatenated, shallower elements first. Arrays
//!   with mismatched element types fall back to replace.
//! - **`Deep`**: tables are merged key by key, deeper values winning on
//!   conflict.
//!
//! A strategy registered below another (`credentials` = deep and
//! `credentials/users/admin/roles` = append) is honored: the merge walks
//! into the subtree and applies the more specific strategy where it is set.
//!
//! # Declaring a hierarchy in a file
//!
//! [`HierarchyConfig::from_file`] reads the same declaration from TOML.
//! Unknown keys are rejected with file path and line number:
//!
//! ```toml
//! levels = ["groups", "replicasets", "instances"]
//! no_inherit = ["credentials"]
//!
//! [no_inherit_from]
//! "__global__" = ["snapshot/dir"]
//!
//! [merge]
//! roles = "append"
//! ```
//!
//! # Walking
//!
//! [`Node::walk`] lazily enumerates `(path, value)` pairs under a prefix,
//! optionally depth-limited, and stops as soon as its [`CancelToken`] is
//! cancelled. [`Node::select`] filters the walk through a pattern.
//!
//! # Logging
//!
//! Tierfig emits [`tracing`](https://docs.rs/tracing) events (per-key
//! decisions at `trace`, matching and collection at `debug`, append
//! fallbacks at `warn`) and never installs a subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`TierfigError`]. The matcher itself
//! returns `Option`; [`Resolver`] turns a miss into
//! [`HierarchyMismatch`](TierfigError::HierarchyMismatch). Collector failures
//! are wrapped in [`CollectorError`], which keeps the underlying cause.

pub mod error;
pub mod types;

mod builder;
mod collect;
mod defaults;
mod env;
mod hierarchy;
pub(crate) mod merge;
mod node;
mod ops;
mod path;
mod pattern;
mod resolve;
mod validate;
mod walk;

#[cfg(test)]
mod fixtures;

pub use builder::{DefaultsType, HierarchyConfig, HierarchyConfigBuilder};
pub use collect::{Collector, SourceFormat, TextCollector, collect_all};
pub use defaults::{DEFAULTS_SOURCE, defaults_from_pairs};
pub use env::EnvCollector;
pub use error::{CollectorError, TierfigError};
pub use hierarchy::{Layers, match_hierarchy};
pub use merge::{deep_merge, merge_key};
pub use node::{Node, NodeKind};
pub use ops::Resolver;
pub use path::{DEFAULT_DELIMITER, KeyPath};
pub use pattern::{ANY, ANY_DEPTH, matches};
pub use resolve::resolve_effective;
pub use types::{GLOBAL, MergeStrategy};
pub use validate::HierarchyFile;
pub use walk::{CancelToken, Walk};
