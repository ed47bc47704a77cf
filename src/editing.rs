//! Text operations the editor surface needs from the core.

use std::ops::Range;

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MarkupConfig;
use crate::markup::comrak_options;

/// Leading bullet, ordered marker or plain indentation, then the content.
static AUTO_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*[*+-]\s+|\s*[0-9]+\.\s+|\s+)(.*)$").unwrap());

/// A link found under the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAt {
    pub url: String,
    pub title: String,
    /// Visible link text.
    pub text: String,
    /// First column of the link (1-based, inclusive).
    pub start: usize,
    /// Last column of the link (1-based, inclusive).
    pub end: usize,
}

/// Finds the link whose source span contains `column` (1-based) in a
/// single-line paragraph.
pub fn find_link_at(line: &str, column: usize) -> Option<LinkAt> {
    let arena = Arena::new();
    let options = comrak_options(&MarkupConfig::default());
    let root = parse_document(&arena, line, &options);
    find_link(root, column)
}

fn find_link<'a>(node: &'a AstNode<'a>, column: usize) -> Option<LinkAt> {
    {
        let data = node.data.borrow();
        if let NodeValue::Link(link) = &data.value {
            let pos = data.sourcepos;
            if pos.start.line == 1 && pos.start.column <= column && column <= pos.end.column {
                return Some(LinkAt {
                    url: link.url.clone(),
                    title: link.title.clone(),
                    text: inline_text(node),
                    start: pos.start.column,
                    end: pos.end.column,
                });
            }
        }
    }
    node.children().find_map(|child| find_link(child, column))
}

fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}

/// Finds `needle` at or after byte offset `from`, wrapping to the start.
pub fn search_next(haystack: &str, needle: &str, from: usize) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }

    let ahead = haystack
        .get(from..)
        .and_then(|rest| rest.find(needle))
        .map(|i| from + i);

    ahead
        .or_else(|| haystack.find(needle))
        .map(|start| start..start + needle.len())
}

/// What to insert when Enter is pressed at the end of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Start the new line with this prefix.
    Continue(String),
    /// The line is only a prefix; clear it instead of continuing.
    ClearLine,
    /// Insert a plain newline.
    Plain,
}

/// Decides how a list item or indented line continues on newline.
pub fn continue_line(line: &str) -> Continuation {
    let Some(caps) = AUTO_INDENT.captures(line) else {
        return Continuation::Plain;
    };
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let content = caps.get(2).map_or("", |m| m.as_str());

    if content.is_empty() {
        Continuation::ClearLine
    } else {
        Continuation::Continue(prefix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_link_at() {
        let line = "See [the docs](https://example.org \"Docs\") for more.";
        let link = find_link_at(line, 8).unwrap();
        assert_eq!(link.url, "https://example.org");
        assert_eq!(link.title, "Docs");
        assert_eq!(link.text, "the docs");
        assert!(link.start <= 8 && 8 <= link.end);
    }

    #[test]
    fn test_find_link_at_misses() {
        let line = "See [the docs](https://example.org) for more.";
        assert_eq!(find_link_at(line, 1), None);
        assert_eq!(find_link_at(line, 45), None);
        assert_eq!(find_link_at("No links here.", 3), None);
    }

    #[test]
    fn test_find_second_link() {
        let line = "[a](https://a.example) and [b](https://b.example)";
        let link = find_link_at(line, 29).unwrap();
        assert_eq!(link.url, "https://b.example");
    }

    #[test]
    fn test_search_next() {
        let text = "one two one two";
        assert_eq!(search_next(text, "two", 0), Some(4..7));
        assert_eq!(search_next(text, "two", 5), Some(12..15));
        assert_eq!(search_next(text, "one", 5), Some(8..11));
    }

    #[test]
    fn test_search_next_wraps() {
        assert_eq!(search_next("one two", "one", 3), Some(0..3));
        assert_eq!(search_next("one two", "one", 100), Some(0..3));
        assert_eq!(search_next("one two", "three", 0), None);
        assert_eq!(search_next("one two", "", 0), None);
    }

    #[test]
    fn test_continue_line() {
        assert_eq!(
            continue_line("- item"),
            Continuation::Continue("- ".to_string())
        );
        assert_eq!(
            continue_line("  12. step"),
            Continuation::Continue("  12. ".to_string())
        );
        assert_eq!(
            continue_line("    code"),
            Continuation::Continue("    ".to_string())
        );
        assert_eq!(continue_line("* "), Continuation::ClearLine);
        assert_eq!(continue_line("Plain text"), Continuation::Plain);
        assert_eq!(continue_line(""), Continuation::Plain);
    }
}
