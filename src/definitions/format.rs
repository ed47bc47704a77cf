//! Serialization formats accepted as definition sources.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Serialization format of a definition source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// YAML mappings, sequences and scalars.
    Yaml,
    /// TOML tables.
    Toml,
    /// JSON objects.
    Json,
    /// Flat `key=value` properties.
    Properties,
}

impl SourceFormat {
    /// Detects the format from a file extension.
    ///
    /// Returns `None` for extensions that do not name a supported format.
    pub fn from_extension(path: &Path) -> Option<SourceFormat> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            "toml" => Some(SourceFormat::Toml),
            "json" => Some(SourceFormat::Json),
            "properties" | "props" => Some(SourceFormat::Properties),
            _ => None,
        }
    }

    /// Returns the format name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Yaml => "yaml",
            SourceFormat::Toml => "toml",
            SourceFormat::Json => "json",
            SourceFormat::Properties => "properties",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            "toml" => Ok(SourceFormat::Toml),
            "json" => Ok(SourceFormat::Json),
            "properties" | "props" => Ok(SourceFormat::Properties),
            _ => Err(format!(
                "Unknown definition format '{}'. Valid formats: yaml, toml, json, properties",
                s
            )),
        }
    }
}
