//! Processor stage selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DefmarkError, Result};

/// A stage of the processor chain, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Substitute delimited definition references.
    Definitions,

    /// Convert Markdown into an anchored block tree.
    Markup,

    /// Render the block tree to HTML with anchor identifiers.
    Anchors,
}

impl StageKind {
    /// The default stage order.
    pub fn default_order() -> Vec<StageKind> {
        vec![StageKind::Definitions, StageKind::Markup, StageKind::Anchors]
    }

    /// Returns the stage name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Definitions => "definitions",
            StageKind::Markup => "markup",
            StageKind::Anchors => "anchors",
        }
    }

    /// Artifact kind the stage consumes.
    pub fn input(&self) -> &'static str {
        match self {
            StageKind::Definitions | StageKind::Markup => "text",
            StageKind::Anchors => "tree",
        }
    }

    /// Artifact kind the stage produces.
    pub fn output(&self) -> &'static str {
        match self {
            StageKind::Definitions => "text",
            StageKind::Markup => "tree",
            StageKind::Anchors => "html",
        }
    }

    /// Checks that each stage accepts what the previous one produces,
    /// starting from text, and that no stage repeats.
    pub fn validate_order(stages: &[StageKind]) -> Result<()> {
        let mut seen = HashSet::new();
        let mut current = "text";
        for stage in stages {
            if !seen.insert(*stage) {
                return Err(DefmarkError::Config(format!(
                    "stage '{}' is listed more than once",
                    stage
                )));
            }
            if stage.input() != current {
                return Err(DefmarkError::Config(format!(
                    "stage '{}' expects {}, but the previous stage produces {}",
                    stage,
                    stage.input(),
                    current
                )));
            }
            current = stage.output();
        }
        Ok(())
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
