//! Scroll correlation between editor paragraphs and rendered anchors.
//!
//! The editor reports a caret line; [`Correlator::approximate_anchor`] walks
//! the source lines up to it, counting the blocks the renderer will produce.
//! [`Correlator::scroll_target`] then turns that count into an anchor that
//! actually exists in the rendered output, falling back to the document
//! edges.

mod lookup;
mod scanner;

pub use lookup::AnchorLookup;
pub use scanner::ParagraphState;

use crate::config::CorrelatorConfig;
use crate::markup::FRONT_MATTER_DELIMITER;
use scanner::Scanner;

/// Where the preview should scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Anchor(usize),
    Bottom,
}

/// Maps source paragraphs to rendered anchors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Correlator {
    config: CorrelatorConfig,
    /// Skip a leading `---` block, which the converter does not anchor.
    front_matter: bool,
}

impl Correlator {
    pub fn new(config: CorrelatorConfig) -> Self {
        Self {
            config,
            front_matter: false,
        }
    }

    /// Matches the converter's front matter setting.
    #[must_use]
    pub fn with_front_matter(mut self, enabled: bool) -> Self {
        self.front_matter = enabled;
        self
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// Counts the blocks that start on lines `0..=paragraph_index`.
    ///
    /// The count is the 1-based index of the block containing the queried
    /// line, or 0 when nothing has been counted yet. Lines of a closed
    /// front matter block count nothing.
    ///
    /// Every list item marker counts, while the renderer anchors a whole
    /// list once, so positions after a list of n items land up to n - 1
    /// anchors late; [`scroll_target`](Self::scroll_target) absorbs small
    /// overshoots by searching backward first.
    pub fn approximate_anchor<S: AsRef<str>>(&self, lines: &[S], paragraph_index: usize) -> usize {
        let start = self.front_matter_end(lines).map_or(0, |end| end + 1);
        let mut scanner = Scanner::new(self.config.indent_width);
        for line in lines
            .iter()
            .take(paragraph_index.saturating_add(1))
            .skip(start)
        {
            scanner.feed(line.as_ref());
        }
        scanner.count()
    }

    /// Index of the line closing a front matter block that opens on the
    /// first line. An unclosed block is ordinary text.
    fn front_matter_end<S: AsRef<str>>(&self, lines: &[S]) -> Option<usize> {
        if !self.front_matter {
            return None;
        }
        let is_delimiter = |line: &S| line.as_ref().trim_end() == FRONT_MATTER_DELIMITER;
        if !is_delimiter(lines.first()?) {
            return None;
        }
        lines
            .iter()
            .skip(1)
            .position(is_delimiter)
            .map(|offset| offset + 1)
    }

    /// Resolves a computed anchor index against the rendered anchors.
    ///
    /// Indices below 2 scroll to the top. Otherwise the nearest present
    /// anchor at or before `index` wins, then the first one within
    /// `forward_window` after it, and failing both the bottom.
    pub fn scroll_target(&self, index: usize, lookup: &impl AnchorLookup) -> ScrollTarget {
        if index < 2 {
            return ScrollTarget::Top;
        }

        if let Some(found) = (1..=index).rev().find(|&i| lookup.has_anchor(i)) {
            return ScrollTarget::Anchor(found);
        }

        let window_end = index.saturating_add(self.config.forward_window);
        if let Some(found) = (index + 1..=window_end).find(|&i| lookup.has_anchor(i)) {
            return ScrollTarget::Anchor(found);
        }

        tracing::debug!("No anchor near {}, scrolling to bottom", index);
        ScrollTarget::Bottom
    }

    /// Computes the anchor for a caret line and resolves it.
    pub fn locate<S: AsRef<str>>(
        &self,
        lines: &[S],
        paragraph_index: usize,
        lookup: &impl AnchorLookup,
    ) -> ScrollTarget {
        let index = self.approximate_anchor(lines, paragraph_index);
        self.scroll_target(index, lookup)
    }
}
