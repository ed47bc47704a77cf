//! Rendered blocks and anchor injection.

use std::fmt;

/// The kind of a top-level rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    CodeBlock,
    List,
    BlockQuote,
    ThematicBreak,
    Table,
    Html,
    Other,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(_) => "heading",
            BlockKind::CodeBlock => "code block",
            BlockKind::List => "list",
            BlockKind::BlockQuote => "block quote",
            BlockKind::ThematicBreak => "thematic break",
            BlockKind::Table => "table",
            BlockKind::Html => "html",
            BlockKind::Other => "block",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Heading(level) => write!(f, "heading {}", level),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Order-assigned identifier of a top-level block (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub index: usize,
    pub kind: BlockKind,
}

impl Anchor {
    /// The element id for this anchor, e.g. `p3`.
    pub fn id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.index)
    }
}

/// One anchored block with its HTML, before id injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub anchor: Anchor,
    /// First source line of the block (1-based).
    pub source_line: usize,
    pub html: String,
}

/// The anchored top-level blocks of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupTree {
    blocks: Vec<RenderedBlock>,
}

impl MarkupTree {
    pub(crate) fn from_blocks(blocks: Vec<RenderedBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns all anchors in document order.
    pub fn anchors(&self) -> Vec<Anchor> {
        self.blocks.iter().map(|b| b.anchor).collect()
    }

    /// Returns true if an anchor with this index exists.
    pub fn has_anchor(&self, index: usize) -> bool {
        index >= 1 && index <= self.blocks.len()
    }

    /// Looks up a block by anchor index.
    pub fn block(&self, index: usize) -> Option<&RenderedBlock> {
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    /// Serializes the blocks, giving each one an `id` of `prefix` + index.
    pub fn to_html(&self, prefix: &str) -> String {
        let mut output = String::new();
        for block in &self.blocks {
            let id = block.anchor.id(prefix);
            if block.anchor.kind == BlockKind::Html {
                output.push_str(&wrap_with_id(&block.html, &id));
            } else {
                output.push_str(&inject_id(&block.html, &id));
            }
        }
        output
    }
}

/// Adds `id="..."` right after the opening tag name of the first element.
fn inject_id(html: &str, id: &str) -> String {
    let Some(rest) = html.strip_prefix('<') else {
        return wrap_with_id(html, id);
    };
    let name_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    if name_len == 0 {
        return wrap_with_id(html, id);
    }

    let split = 1 + name_len;
    let mut output = String::with_capacity(html.len() + id.len() + 6);
    output.push_str(&html[..split]);
    output.push_str(" id=\"");
    output.push_str(id);
    output.push('"');
    output.push_str(&html[split..]);
    output
}

fn wrap_with_id(html: &str, id: &str) -> String {
    format!("<div id=\"{}\">\n{}</div>\n", id, html)
}
