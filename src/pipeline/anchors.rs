//! Anchor injection stage.

use crate::errors::Result;

use super::{unexpected, Artifact, ProcessContext, Processor};

/// Serializes a tree to HTML with an `id` on every top-level block.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorProcessor;

impl Processor for AnchorProcessor {
    fn name(&self) -> &str {
        "anchors"
    }

    fn process(&self, artifact: Artifact, context: &ProcessContext) -> Result<Artifact> {
        match artifact {
            Artifact::Tree(tree) => Ok(Artifact::Html(tree.to_html(&context.markup.anchor_prefix))),
            other => Err(unexpected(self.name(), "tree", &other)),
        }
    }
}
