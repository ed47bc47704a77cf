//! Markdown conversion with order-based block anchors.
//!
//! Text is parsed with `comrak`; each top-level block that renders to
//! something gets the next anchor index, starting at 1. Front matter never
//! gets an anchor.

mod tree;

use comrak::nodes::{AstNode, NodeValue};
use comrak::{format_html, parse_document, Arena, ComrakOptions};

pub use tree::{Anchor, BlockKind, MarkupTree, RenderedBlock};

/// Line that opens and closes a front matter block.
pub(crate) const FRONT_MATTER_DELIMITER: &str = "---";

use crate::config::MarkupConfig;
use crate::errors::{DefmarkError, Result};

/// Converts Markdown text into an anchored [`MarkupTree`].
#[derive(Debug, Clone)]
pub struct MarkupConverter {
    options: ComrakOptions<'static>,
}

impl MarkupConverter {
    pub fn new(config: &MarkupConfig) -> Self {
        Self {
            options: comrak_options(config),
        }
    }

    /// Parses the text and renders each top-level block.
    pub fn convert(&self, text: &str) -> Result<MarkupTree> {
        let arena = Arena::new();
        let root = parse_document(&arena, text, &self.options);

        let mut blocks = Vec::new();
        for node in root.children() {
            let Some(kind) = block_kind(node) else {
                continue;
            };

            let mut buffer = Vec::new();
            format_html(node, &self.options, &mut buffer)?;
            let html = String::from_utf8(buffer)
                .map_err(|_| DefmarkError::Encoding("rendered HTML".to_string()))?;
            if html.trim().is_empty() {
                continue;
            }

            blocks.push(RenderedBlock {
                anchor: Anchor {
                    index: blocks.len() + 1,
                    kind,
                },
                source_line: node.data.borrow().sourcepos.start.line,
                html,
            });
        }

        tracing::debug!("Rendered {} anchored blocks", blocks.len());
        Ok(MarkupTree::from_blocks(blocks))
    }
}

/// Parser options shared by conversion and link lookup.
pub(crate) fn comrak_options(config: &MarkupConfig) -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = config.table;
    options.extension.strikethrough = config.strikethrough;
    options.extension.autolink = config.autolink;
    options.extension.tasklist = config.tasklist;
    if config.front_matter {
        options.extension.front_matter_delimiter = Some(FRONT_MATTER_DELIMITER.to_string());
    }
    options.render.unsafe_ = true;
    options
}

/// Classifies a top-level node; `None` for nodes that never get an anchor.
fn block_kind<'a>(node: &'a AstNode<'a>) -> Option<BlockKind> {
    let kind = match &node.data.borrow().value {
        NodeValue::FrontMatter(_) => return None,
        NodeValue::Paragraph => BlockKind::Paragraph,
        NodeValue::Heading(heading) => BlockKind::Heading(heading.level),
        NodeValue::CodeBlock(_) => BlockKind::CodeBlock,
        NodeValue::List(_) => BlockKind::List,
        NodeValue::BlockQuote => BlockKind::BlockQuote,
        NodeValue::ThematicBreak => BlockKind::ThematicBreak,
        NodeValue::Table(_) => BlockKind::Table,
        NodeValue::HtmlBlock(_) => BlockKind::Html,
        _ => BlockKind::Other,
    };
    Some(kind)
}
