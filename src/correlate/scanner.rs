//! Line-by-line block counting.

use once_cell::sync::Lazy;
use regex::Regex;

/// Heading, list item or ordered item followed by content.
static BLOCK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6}|[*+-]|\d+[.)])\s+\S").unwrap());

/// Opening or closing code fence: three or more backticks or tildes.
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap());

/// Classification of the line being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphState {
    #[default]
    Plain,
    /// The line that opened a fence.
    FencedOpen,
    /// Inside a fence.
    FencedBody,
    IndentedCode,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

/// Counts rendered blocks as lines are fed in order.
#[derive(Debug)]
pub(super) struct Scanner {
    indent_width: usize,
    state: ParagraphState,
    fence: Option<Fence>,
    prev_blank: bool,
    prev_quote: bool,
    in_list: bool,
    count: usize,
}

impl Scanner {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_width: indent_width.max(1),
            state: ParagraphState::Plain,
            fence: None,
            prev_blank: true,
            prev_quote: false,
            in_list: false,
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    #[cfg(test)]
    pub fn state(&self) -> ParagraphState {
        self.state
    }

    pub fn feed(&mut self, line: &str) {
        let blank = line.trim().is_empty();

        match self.state {
            ParagraphState::FencedOpen | ParagraphState::FencedBody => {
                if self.closes_fence(line) {
                    self.state = ParagraphState::Plain;
                    self.fence = None;
                } else {
                    self.state = ParagraphState::FencedBody;
                }
                self.prev_blank = false;
                self.prev_quote = false;
                return;
            }
            ParagraphState::IndentedCode => {
                if blank || self.indent(line) >= self.indent_width {
                    self.prev_blank = blank;
                    return;
                }
                self.state = ParagraphState::Plain;
                // Indented code cannot absorb a lazy continuation line.
                self.prev_blank = true;
            }
            ParagraphState::Plain => {}
        }

        self.feed_plain(line, blank);
    }

    fn feed_plain(&mut self, line: &str, blank: bool) {
        if blank {
            self.prev_blank = true;
            self.prev_quote = false;
            return;
        }

        let indent = self.indent(line);
        let quote = line.trim_start().starts_with('>');
        let mut heading = false;

        if let Some(fence) = open_fence(line) {
            self.count += 1;
            self.state = ParagraphState::FencedOpen;
            self.fence = Some(fence);
            self.in_list = false;
        } else if indent >= self.indent_width {
            if self.prev_blank && !self.in_list {
                self.count += 1;
                self.state = ParagraphState::IndentedCode;
            }
        } else if quote {
            if !self.prev_quote {
                self.count += 1;
                self.in_list = false;
            }
        } else if let Some(caps) = BLOCK_MARKER.captures(line) {
            self.count += 1;
            heading = caps.get(1).is_some_and(|m| m.as_str().starts_with('#'));
            self.in_list = !heading;
        } else if self.prev_blank {
            self.count += 1;
            self.in_list = false;
        }

        // A heading is a single line; whatever follows starts a new block.
        self.prev_blank = heading;
        self.prev_quote = quote;
    }

    fn closes_fence(&self, line: &str) -> bool {
        let Some(open) = self.fence else {
            return true;
        };
        match open_fence(line) {
            Some(close) => {
                close.marker == open.marker
                    && close.len >= open.len
                    && line.trim_start().trim_start_matches(close.marker).trim().is_empty()
            }
            None => false,
        }
    }

    /// Leading columns; a tab counts as a full indent.
    fn indent(&self, line: &str) -> usize {
        line.chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .map(|c| if c == '\t' { self.indent_width } else { 1 })
            .sum()
    }
}

fn open_fence(line: &str) -> Option<Fence> {
    let caps = FENCE.captures(line)?;
    let run = caps.get(1)?.as_str();
    let marker = run.chars().next()?;
    Some(Fence {
        marker,
        len: run.chars().count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(lines: &[&str]) -> usize {
        let mut scanner = Scanner::new(4);
        for line in lines {
            scanner.feed(line);
        }
        scanner.count()
    }

    #[test]
    fn test_markers_start_blocks() {
        assert_eq!(count(&["# Title", "Text right after"]), 2);
        assert_eq!(count(&["Intro", "- one", "- two", "1. three"]), 4);
        assert_eq!(count(&["Para", "> quoted", "> still quoted"]), 2);
    }

    #[test]
    fn test_continuation_lines_do_not_count() {
        assert_eq!(count(&["A long", "paragraph", "wraps"]), 1);
    }

    #[test]
    fn test_fence_needs_matching_close() {
        // A tilde line cannot close a backtick fence.
        assert_eq!(count(&["```", "~~~", "", "inside", "```", "", "after"]), 2);
        // A shorter run cannot close a longer fence.
        assert_eq!(count(&["````", "```", "", "inside", "````", "", "after"]), 2);
    }

    #[test]
    fn test_fence_content_ignored() {
        assert_eq!(count(&["```rust", "# not a heading", "", "- not a list", "```"]), 1);
    }

    #[test]
    fn test_indented_code() {
        let lines = ["Para", "", "    code", "    more", "", "    still", "Next"];
        assert_eq!(count(&lines), 3);
    }

    #[test]
    fn test_tab_indent() {
        assert_eq!(count(&["Para", "", "\tcode", "\tcode"]), 2);
    }

    #[test]
    fn test_indented_after_paragraph_is_continuation() {
        assert_eq!(count(&["Para", "    not code"]), 1);
    }

    #[test]
    fn test_indented_under_list_item() {
        assert_eq!(count(&["- item", "", "    item body", "", "Next"]), 2);
    }

    #[test]
    fn test_states() {
        let mut scanner = Scanner::new(4);
        scanner.feed("```");
        assert_eq!(scanner.state(), ParagraphState::FencedOpen);
        scanner.feed("x");
        assert_eq!(scanner.state(), ParagraphState::FencedBody);
        scanner.feed("```");
        assert_eq!(scanner.state(), ParagraphState::Plain);
        scanner.feed("");
        scanner.feed("    code");
        assert_eq!(scanner.state(), ParagraphState::IndentedCode);
    }
}
