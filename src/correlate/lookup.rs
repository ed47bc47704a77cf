use std::collections::BTreeSet;

use crate::markup::MarkupTree;

/// Answers whether the rendered output contains an anchor.
pub trait AnchorLookup {
    fn has_anchor(&self, index: usize) -> bool;
}

impl AnchorLookup for MarkupTree {
    fn has_anchor(&self, index: usize) -> bool {
        MarkupTree::has_anchor(self, index)
    }
}

impl AnchorLookup for BTreeSet<usize> {
    fn has_anchor(&self, index: usize) -> bool {
        self.contains(&index)
    }
}

impl<F> AnchorLookup for F
where
    F: Fn(usize) -> bool,
{
    fn has_anchor(&self, index: usize) -> bool {
        self(index)
    }
}
