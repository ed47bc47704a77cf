//! Hierarchical definition trees and their flattening.
//!
//! Every supported serialization is first converted into a [`DefinitionTree`],
//! so flattening behaves the same regardless of where the definitions came
//! from.

use indexmap::IndexMap;

use crate::errors::{DefmarkError, Result};

/// A nested key/value tree read from one definition source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionTree {
    /// A leaf value, already rendered as text.
    Scalar(String),
    /// Named children in source order.
    Table(IndexMap<String, DefinitionTree>),
    /// Positional children.
    List(Vec<DefinitionTree>),
}

/// One flattened definition: a key path and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// Key segments from the root of the tree.
    pub path: Vec<String>,
    /// The leaf value.
    pub value: String,
}

impl FlatEntry {
    /// Splits flat `key = value` pairs into entries without nesting them.
    ///
    /// `app` and `app.version` are independent entries even though one key
    /// prefixes the other. A repeated key keeps its first position and takes
    /// the later value.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, String)>,
        separator: &str,
    ) -> Vec<FlatEntry> {
        let mut merged: IndexMap<String, String> = IndexMap::new();
        for (key, value) in pairs {
            merged.insert(key, value);
        }
        merged
            .into_iter()
            .map(|(key, value)| FlatEntry {
                path: key.split(separator).map(str::to_string).collect(),
                value,
            })
            .collect()
    }

    /// Joins the path with the separator.
    pub fn key(&self, separator: &str) -> String {
        self.path.join(separator)
    }
}

impl DefinitionTree {
    /// Parses YAML text into a tree.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(DefinitionTree::empty());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Self::try_from_yaml(value)
    }

    /// Parses TOML text into a tree.
    pub fn from_toml(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(Self::from_toml_value(toml::Value::Table(table)))
    }

    /// Parses JSON text into a tree.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(DefinitionTree::empty());
        }
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_json_value(value))
    }

    /// An empty table.
    pub fn empty() -> Self {
        DefinitionTree::Table(IndexMap::new())
    }

    /// Builds a single-level table from flat `key = value` pairs.
    ///
    /// Keys are kept whole; a repeated key keeps its first position and takes
    /// the later value.
    pub fn from_flat_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        DefinitionTree::Table(
            pairs
                .into_iter()
                .map(|(k, v)| (k, DefinitionTree::Scalar(v)))
                .collect(),
        )
    }

    fn try_from_yaml(value: serde_yaml::Value) -> Result<Self> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => DefinitionTree::Scalar(String::new()),
            Value::Bool(b) => DefinitionTree::Scalar(b.to_string()),
            Value::Number(n) => DefinitionTree::Scalar(n.to_string()),
            Value::String(s) => DefinitionTree::Scalar(s),
            Value::Sequence(items) => DefinitionTree::List(
                items
                    .into_iter()
                    .map(Self::try_from_yaml)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Mapping(mapping) => {
                let mut table = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    table.insert(yaml_key(key)?, Self::try_from_yaml(value)?);
                }
                DefinitionTree::Table(table)
            }
            Value::Tagged(tagged) => Self::try_from_yaml(tagged.value)?,
        })
    }

    fn from_toml_value(value: toml::Value) -> Self {
        use toml::Value;

        match value {
            Value::String(s) => DefinitionTree::Scalar(s),
            Value::Integer(i) => DefinitionTree::Scalar(i.to_string()),
            Value::Float(f) => DefinitionTree::Scalar(f.to_string()),
            Value::Boolean(b) => DefinitionTree::Scalar(b.to_string()),
            Value::Datetime(dt) => DefinitionTree::Scalar(dt.to_string()),
            Value::Array(items) => {
                DefinitionTree::List(items.into_iter().map(Self::from_toml_value).collect())
            }
            Value::Table(table) => DefinitionTree::Table(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_toml_value(v)))
                    .collect(),
            ),
        }
    }

    fn from_json_value(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => DefinitionTree::Scalar(String::new()),
            Value::Bool(b) => DefinitionTree::Scalar(b.to_string()),
            Value::Number(n) => DefinitionTree::Scalar(n.to_string()),
            Value::String(s) => DefinitionTree::Scalar(s),
            Value::Array(items) => {
                DefinitionTree::List(items.into_iter().map(Self::from_json_value).collect())
            }
            Value::Object(map) => DefinitionTree::Table(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json_value(v)))
                    .collect(),
            ),
        }
    }

    /// Flattens the tree into leaf entries in document order.
    ///
    /// List items use their zero-based index as a path segment. A scalar at
    /// the root has no key and is dropped, as are empty tables and lists.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        self.flatten_into(&mut path, &mut entries);
        entries
    }

    fn flatten_into(&self, path: &mut Vec<String>, out: &mut Vec<FlatEntry>) {
        match self {
            DefinitionTree::Scalar(value) => {
                if !path.is_empty() {
                    out.push(FlatEntry {
                        path: path.clone(),
                        value: value.clone(),
                    });
                }
            }
            DefinitionTree::Table(children) => {
                for (key, child) in children {
                    path.push(key.clone());
                    child.flatten_into(path, out);
                    path.pop();
                }
            }
            DefinitionTree::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(index.to_string());
                    item.flatten_into(path, out);
                    path.pop();
                }
            }
        }
    }
}

/// Renders a YAML mapping key as a path segment.
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(DefmarkError::Other(format!(
            "unsupported YAML mapping key: {:?}",
            other
        ))),
    }
}
