//! Definition substitution stage.

use crate::errors::Result;

use super::{unexpected, Artifact, ProcessContext, Processor};

/// Replaces delimited keys with their values from the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionProcessor;

impl Processor for DefinitionProcessor {
    fn name(&self) -> &str {
        "definitions"
    }

    fn process(&self, artifact: Artifact, context: &ProcessContext) -> Result<Artifact> {
        let text = match artifact {
            Artifact::Text(text) => text,
            other => return Err(unexpected(self.name(), "text", &other)),
        };

        let replacer = context.snapshot.replacer();
        if text.is_empty() || replacer.is_empty() {
            return Ok(Artifact::Text(text));
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            for reference in replacer.unresolved(&text, &context.sigils) {
                tracing::debug!(
                    "Unresolved reference {} at {}",
                    reference.key,
                    reference.location(&text)
                );
            }
        }

        Ok(Artifact::Text(replacer.replace(&text)))
    }
}
