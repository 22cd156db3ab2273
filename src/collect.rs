//! Collectors turn external sources into raw [`Node`] trees.
//!
//! A [`Collector`] produces one tree per call. [`collect_all`] runs a list of
//! collectors in priority-ascending order (last = highest) and deep-merges
//! their outputs into a single raw tree, the one the hierarchy matcher walks.
//!
//! Every node in a collected tree carries the collector's name as its source
//! and the collector's 1-based position in the list as its revision, so the
//! merged tree still tells which source each value came from.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::error::{CollectorError, TierfigError};
use crate::merge::deep_merge;
use crate::node::Node;

/// A source of configuration data.
pub trait Collector {
    /// Name recorded as the source of every node this collector produces.
    fn name(&self) -> &str;

    /// Build a fresh tree. Failures carry the collector's name.
    fn collect(&self) -> Result<Node, CollectorError>;
}

/// Text format understood by [`TextCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Toml,
    Json,
}

impl SourceFormat {
    /// `.json` files are JSON; everything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

#[derive(Debug, Clone)]
enum Input {
    Inline(String),
    File { path: PathBuf, optional: bool },
}

/// Collects a TOML or JSON document, given inline or read from a file.
///
/// The document's top level must be a table (an object, in JSON).
#[derive(Debug, Clone)]
pub struct TextCollector {
    name: String,
    format: SourceFormat,
    input: Input,
}

impl TextCollector {
    pub fn toml(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: SourceFormat::Toml,
            input: Input::Inline(content.into()),
        }
    }

    pub fn json(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: SourceFormat::Json,
            input: Input::Inline(content.into()),
        }
    }

    /// Read `path` at collection time. The format follows the extension and
    /// the collector is named after the path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            format: SourceFormat::from_path(&path),
            input: Input::File {
                path,
                optional: false,
            },
        }
    }

    /// A missing file yields an empty tree instead of an error.
    /// Other I/O errors still fail.
    pub fn optional(mut self) -> Self {
        if let Input::File { optional, .. } = &mut self.input {
            *optional = true;
        }
        self
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    fn parse(&self, content: &str) -> Result<Table, CollectorError> {
        let value = match self.format {
            SourceFormat::Toml => {
                return toml::from_str::<Table>(content)
                    .map_err(|e| CollectorError::new(&self.name, e));
            }
            SourceFormat::Json => serde_json::from_str::<Value>(content)
                .map_err(|e| CollectorError::new(&self.name, e))?,
        };
        match value {
            Value::Table(table) => Ok(table),
            other => Err(CollectorError::new(
                &self.name,
                format!("top-level value is {}, expected an object", other.type_str()),
            )),
        }
    }
}

impl Collector for TextCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<Node, CollectorError> {
        let table = match &self.input {
            Input::Inline(content) => self.parse(content)?,
            Input::File { path, optional } => match std::fs::read_to_string(path) {
                Ok(content) => self.parse(&content)?,
                Err(e) if *optional && e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "optional source missing, skipping");
                    Table::new()
                }
                Err(e) => return Err(CollectorError::new(&self.name, e)),
            },
        };
        Ok(Node::from_table(table, &self.name))
    }
}

/// Run `collectors` in order and deep-merge their trees; later ones win.
///
/// The first failing collector aborts the whole collection.
pub fn collect_all(collectors: &[&dyn Collector]) -> Result<Node, TierfigError> {
    let mut result = Node::branch();
    for (i, collector) in collectors.iter().enumerate() {
        let mut tree = collector.collect()?;
        tree.stamp_revision(i as u64 + 1);
        debug!(
            collector = collector.name(),
            keys = tree.child_names().len(),
            "collected"
        );
        deep_merge(&mut result, &tree);
    }
    Ok(result)
}
