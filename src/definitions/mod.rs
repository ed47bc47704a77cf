//! Definition sources and the flat mapping built from them.
//!
//! Sources are hierarchical key/value documents (YAML, TOML, JSON or
//! properties). Each one is parsed into a [`DefinitionTree`], flattened into
//! separator-joined keys and merged into the [`DefinitionStore`].

mod format;
mod properties;
mod store;
mod tree;

use std::fmt;

pub use format::SourceFormat;
pub use properties::parse_properties;
pub use store::{DefinitionStore, FlatMapping, LoadReport, Snapshot};
pub use tree::{DefinitionTree, FlatEntry};

use crate::errors::Result;

/// Identifies a definition source, usually by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a source identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A resolved definition in the flat mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Key segments as they appeared in the source.
    pub path: Vec<String>,
    /// Segments joined with the configured separator.
    pub key: String,
    pub value: String,
    /// The source that supplied the winning value.
    pub source: SourceId,
}

/// Parses source text of the given format into a tree.
///
/// Properties are already flat, so they come back as a single-level table
/// keyed by the whole property name.
pub fn parse_source(format: SourceFormat, text: &str) -> Result<DefinitionTree> {
    match format {
        SourceFormat::Yaml => DefinitionTree::from_yaml(text),
        SourceFormat::Toml => DefinitionTree::from_toml(text),
        SourceFormat::Json => DefinitionTree::from_json(text),
        SourceFormat::Properties => Ok(DefinitionTree::from_flat_pairs(parse_properties(text)?)),
    }
}

/// Parses and flattens a source into entries in document order.
///
/// Properties keys are split on `separator`, so `a.b=1` collides with YAML's
/// `a: {b: 1}`, while `a=1` and `a.b=2` in one file both survive.
pub fn load_entries(format: SourceFormat, text: &str, separator: &str) -> Result<Vec<FlatEntry>> {
    match format {
        SourceFormat::Properties => Ok(FlatEntry::from_pairs(parse_properties(text)?, separator)),
        _ => Ok(parse_source(format, text)?.flatten()),
    }
}
