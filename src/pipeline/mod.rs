//! The processor chain: an ordered list of document transformations.
//!
//! Each [`Processor`] takes the artifact produced by the previous one. The
//! built-in stages resolve definitions (text to text), convert Markdown
//! (text to tree) and inject anchors (tree to HTML).

mod anchors;
mod definitions;
mod markup;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

pub use anchors::AnchorProcessor;
pub use definitions::DefinitionProcessor;
pub use markup::MarkupProcessor;

use crate::config::{MarkupConfig, StageKind};
use crate::definitions::Snapshot;
use crate::errors::{DefmarkError, Result};
use crate::markup::MarkupTree;
use crate::sigils::SigilOperator;

/// The value passed between stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Text(String),
    Tree(MarkupTree),
    Html(String),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Text(_) => "text",
            Artifact::Tree(_) => "tree",
            Artifact::Html(_) => "html",
        }
    }

    /// Returns the text of a `Text` or `Html` artifact.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Artifact::Text(s) | Artifact::Html(s) => Some(s),
            Artifact::Tree(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<MarkupTree> {
        match self {
            Artifact::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Everything a stage may read while processing one document.
///
/// Immutable for the duration of a run; the snapshot is shared, not copied.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    pub snapshot: Arc<Snapshot>,
    pub sigils: SigilOperator,
    pub markup: MarkupConfig,
}

impl ProcessContext {
    pub fn new(snapshot: Arc<Snapshot>, sigils: SigilOperator, markup: MarkupConfig) -> Self {
        Self {
            snapshot,
            sigils,
            markup,
        }
    }
}

/// A single stage of the chain.
pub trait Processor: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// Transforms the artifact.
    ///
    /// A stage handed an artifact kind it does not accept returns a
    /// pipeline error naming itself.
    fn process(&self, artifact: Artifact, context: &ProcessContext) -> Result<Artifact>;
}

/// Builds the error for an artifact a stage cannot consume.
pub(crate) fn unexpected(stage: &str, expected: &str, got: &Artifact) -> DefmarkError {
    DefmarkError::stage(stage, format!("expected {}, got {}", expected, got.kind()))
}

/// Ordered processors run over one document.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.processors.iter().map(|p| p.name()).collect();
        f.debug_struct("ProcessorChain")
            .field("processors", &names)
            .finish()
    }
}

impl ProcessorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Creates the built-in stages in the given order.
    pub fn from_config(stages: &[StageKind]) -> Self {
        let mut chain = Self::new();
        for stage in stages {
            match stage {
                StageKind::Definitions => chain.add(DefinitionProcessor),
                StageKind::Markup => chain.add(MarkupProcessor),
                StageKind::Anchors => chain.add(AnchorProcessor),
            }
        }
        chain
    }

    /// Appends a processor.
    pub fn add<P: Processor + 'static>(&mut self, processor: P) {
        self.processors.push(Box::new(processor));
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Returns the processor names in order.
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Threads the text through every stage.
    pub fn run(&self, text: &str, context: &ProcessContext) -> Result<Artifact> {
        self.run_inspect(text, context, |_, _| {})
    }

    /// Like [`run`](Self::run), also handing each intermediate artifact to
    /// `inspect` along with the name of the stage that produced it.
    pub fn run_inspect(
        &self,
        text: &str,
        context: &ProcessContext,
        mut inspect: impl FnMut(&str, &Artifact),
    ) -> Result<Artifact> {
        let mut artifact = Artifact::Text(text.to_string());
        for processor in &self.processors {
            let started = Instant::now();
            artifact = processor.process(artifact, context)?;
            tracing::debug!(
                "Stage {} produced {} in {:?}",
                processor.name(),
                artifact.kind(),
                started.elapsed()
            );
            inspect(processor.name(), &artifact);
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sigils;
    use crate::definitions::{DefinitionStore, SourceFormat, SourceId};
    use pretty_assertions::assert_eq;

    fn context(yaml: &str) -> ProcessContext {
        let sigils = SigilOperator::new(Sigils::default()).unwrap();
        let store = DefinitionStore::new(sigils.clone(), ".");
        store
            .load(SourceId::new("vars.yaml"), SourceFormat::Yaml, yaml)
            .unwrap();
        ProcessContext::new(store.snapshot(), sigils, MarkupConfig::default())
    }

    struct Shout;

    impl Processor for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn process(&self, artifact: Artifact, _context: &ProcessContext) -> Result<Artifact> {
            match artifact {
                Artifact::Text(text) => Ok(Artifact::Text(text.to_uppercase())),
                other => Err(unexpected(self.name(), "text", &other)),
            }
        }
    }

    #[test]
    fn test_default_chain() {
        let chain = ProcessorChain::from_config(&StageKind::default_order());
        assert_eq!(chain.names(), vec!["definitions", "markup", "anchors"]);

        let result = chain
            .run("Hello {{name}}.\n\n# {{title}}\n", &context("name: Ada\ntitle: Notes\n"))
            .unwrap();
        assert_eq!(
            result,
            Artifact::Html("<p id=\"p1\">Hello Ada.</p>\n<h1 id=\"p2\">Notes</h1>\n".to_string())
        );
    }

    #[test]
    fn test_empty_input() {
        let chain = ProcessorChain::from_config(&StageKind::default_order());
        let result = chain.run("", &context("a: 1\n")).unwrap();
        assert_eq!(result, Artifact::Html(String::new()));
    }

    #[test]
    fn test_definitions_only() {
        let chain = ProcessorChain::from_config(&[StageKind::Definitions]);
        let result = chain.run("{{a}} and {{b}}", &context("a: 1\n")).unwrap();
        assert_eq!(result, Artifact::Text("1 and {{b}}".to_string()));
    }

    #[test]
    fn test_custom_processor() {
        let mut chain = ProcessorChain::new();
        chain.add(DefinitionProcessor);
        chain.add(Shout);
        let result = chain.run("{{a}} x", &context("a: yes\n")).unwrap();
        assert_eq!(result.as_str(), Some("YES X"));
    }

    #[test]
    fn test_wrong_artifact_kind() {
        let chain = ProcessorChain::from_config(&[StageKind::Anchors]);
        let err = chain.run("text", &context("a: 1\n")).unwrap_err();
        match err {
            DefmarkError::Pipeline { stage, message } => {
                assert_eq!(stage, "anchors");
                assert_eq!(message, "expected tree, got text");
            }
            other => panic!("Expected Pipeline error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_inspect_sees_every_stage() {
        let chain = ProcessorChain::from_config(&StageKind::default_order());
        let mut seen = Vec::new();
        chain
            .run_inspect("{{a}}", &context("a: 1\n"), |stage, artifact| {
                seen.push(format!("{}:{}", stage, artifact.kind()));
            })
            .unwrap();
        assert_eq!(seen, vec!["definitions:text", "markup:tree", "anchors:html"]);
    }

    #[test]
    fn test_empty_chain_returns_text() {
        let chain = ProcessorChain::new();
        assert!(chain.is_empty());
        let result = chain.run("raw", &context("a: 1\n")).unwrap();
        assert_eq!(result, Artifact::Text("raw".to_string()));
    }
}
