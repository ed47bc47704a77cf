//! Markdown conversion stage.

use crate::errors::{DefmarkError, Result};
use crate::markup::{MarkupConverter, MarkupTree};

use super::{unexpected, Artifact, ProcessContext, Processor};

/// Parses text into an anchored tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupProcessor;

impl Processor for MarkupProcessor {
    fn name(&self) -> &str {
        "markup"
    }

    fn process(&self, artifact: Artifact, context: &ProcessContext) -> Result<Artifact> {
        let text = match artifact {
            Artifact::Text(text) => text,
            other => return Err(unexpected(self.name(), "text", &other)),
        };

        if text.is_empty() {
            return Ok(Artifact::Tree(MarkupTree::default()));
        }

        let tree = MarkupConverter::new(&context.markup)
            .convert(&text)
            .map_err(|e| DefmarkError::stage(self.name(), e.to_string()))?;
        Ok(Artifact::Tree(tree))
    }
}
