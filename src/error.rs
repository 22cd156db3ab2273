use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried by a [`CollectorError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TierfigError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Path '{0}' does not match the declared hierarchy")]
    HierarchyMismatch(String),

    #[error("No inheritance configured: declare a hierarchy before resolving")]
    NoInheritance,

    /// Reserved for callers validating an effective tree against their schema.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Reserved for callers whose schema itself is malformed.
    #[error("Invalid schema: {0}")]
    SchemaInvalid(String),

    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error("Unknown level '{level}' in no-inherit-from rule (levels: {available})")]
    UnknownLevel { level: String, available: String },

    #[error("Invalid levels: {0}")]
    InvalidLevels(String),

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in hierarchy file")]
    UnknownKeys(Vec<TierfigError>),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A collector failed to produce its tree.
///
/// Keeps the collector's name next to the underlying cause, which stays
/// reachable through [`std::error::Error::source`] or [`into_inner`](Self::into_inner).
#[derive(Debug, Error)]
#[error("collector '{collector}' failed: {source}")]
pub struct CollectorError {
    collector: String,
    #[source]
    source: BoxError,
}

impl CollectorError {
    pub fn new(collector: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            collector: collector.into(),
            source: source.into(),
        }
    }

    /// Name of the collector that failed.
    pub fn collector(&self) -> &str {
        &self.collector
    }

    /// Borrow the underlying cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Take ownership of the underlying cause.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}
