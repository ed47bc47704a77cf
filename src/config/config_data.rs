//! Configuration data structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::sigils::Sigils;
use super::stage_kind::StageKind;

/// Main configuration structure for defmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns for definition files, in precedence order (later wins).
    #[serde(default)]
    pub definitions: Vec<String>,

    /// Separator used when joining nested definition keys.
    #[serde(default = "default_key_separator")]
    pub key_separator: String,

    /// Processor stages, in the order they run.
    #[serde(default = "StageKind::default_order")]
    pub stages: Vec<StageKind>,

    /// Delimiters bracketing references in documents.
    #[serde(default)]
    pub sigils: Sigils,

    /// Markdown conversion settings.
    #[serde(default)]
    pub markup: MarkupConfig,

    /// Scroll correlation settings.
    #[serde(default)]
    pub correlator: CorrelatorConfig,

    /// Watch configuration.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Additional custom settings.
    #[serde(default, flatten)]
    pub extra: HashMap<String, toml::Value>,
}

fn default_key_separator() -> String {
    ".".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
            key_separator: default_key_separator(),
            stages: StageKind::default_order(),
            sigils: Sigils::default(),
            markup: MarkupConfig::default(),
            correlator: CorrelatorConfig::default(),
            watch: WatchConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition file patterns.
    pub fn definition_patterns(&self) -> &[String] {
        &self.definitions
    }

    /// Checks values that serde cannot reject on its own.
    pub fn validate(&self) -> crate::errors::Result<()> {
        self.sigils.validate()?;
        if self.key_separator.is_empty() {
            return Err(crate::errors::DefmarkError::Config(
                "key_separator must not be empty".to_string(),
            ));
        }
        if self.markup.anchor_prefix.is_empty() {
            return Err(crate::errors::DefmarkError::Config(
                "markup.anchor_prefix must not be empty".to_string(),
            ));
        }
        if self.correlator.indent_width == 0 {
            return Err(crate::errors::DefmarkError::Config(
                "correlator.indent_width must be at least 1".to_string(),
            ));
        }
        StageKind::validate_order(&self.stages)?;
        Ok(())
    }
}

/// Markdown conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Prefix of rendered anchor identifiers (`p` gives `p1`, `p2`, ...).
    #[serde(default = "default_anchor_prefix")]
    pub anchor_prefix: String,

    /// Enable GFM tables.
    #[serde(default = "default_true")]
    pub table: bool,

    /// Enable `~~strikethrough~~`.
    #[serde(default = "default_true")]
    pub strikethrough: bool,

    /// Enable bare URL autolinks.
    #[serde(default = "default_true")]
    pub autolink: bool,

    /// Enable `- [ ]` task list items.
    #[serde(default = "default_true")]
    pub tasklist: bool,

    /// Recognise a leading `---` front matter block.
    #[serde(default = "default_true")]
    pub front_matter: bool,
}

fn default_anchor_prefix() -> String {
    "p".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            anchor_prefix: default_anchor_prefix(),
            table: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            front_matter: true,
        }
    }
}

/// Scroll correlation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelatorConfig {
    /// Leading columns that turn a line into indented code.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// How many anchors past the computed one to search before giving up.
    #[serde(default = "default_forward_window")]
    pub forward_window: usize,
}

fn default_indent_width() -> usize {
    4
}

fn default_forward_window() -> usize {
    5
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            forward_window: default_forward_window(),
        }
    }
}

/// Watch mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}
