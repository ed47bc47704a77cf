//! Single-pass substitution of delimited definition keys.
//!
//! A [`Replacer`] compiles every entokened key of a mapping snapshot into one
//! Aho-Corasick automaton. The automaton is built once per snapshot and shared
//! by every substitution that uses the snapshot.
//!
//! Matching rules:
//!
//! - a match adjacent to a word character (alphanumeric or `_`) on either
//!   side is rejected;
//! - accepted matches never overlap; scanning left to right, the earliest
//!   match wins, and at the same start the key registered first wins;
//! - text that matches no key, including tokens for undefined keys, is
//!   copied through unchanged.

use std::collections::HashMap;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::errors::Result;
use crate::sigils::{Reference, SigilOperator};

/// A candidate match before overlap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: usize,
    pattern: usize,
}

/// Multi-pattern replacer over one mapping snapshot.
#[derive(Debug, Clone)]
pub struct Replacer {
    /// `None` when the mapping is empty.
    automaton: Option<AhoCorasick>,
    /// Plain keys, indexed by pattern id.
    keys: Vec<String>,
    /// Replacement values, indexed by pattern id.
    values: Vec<String>,
    /// Key to pattern id.
    index: HashMap<String, usize>,
}

impl Replacer {
    /// Builds a replacer for the given `(key, value)` pairs.
    ///
    /// Pattern ids follow iteration order, which decides ties between keys
    /// that match at the same position.
    pub fn new<K, V>(
        entries: impl IntoIterator<Item = (K, V)>,
        operator: &SigilOperator,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut index = HashMap::new();

        for (key, value) in entries {
            let key = key.as_ref();
            if index.contains_key(key) {
                continue;
            }
            index.insert(key.to_string(), keys.len());
            keys.push(key.to_string());
            values.push(value.into());
        }

        let automaton = if keys.is_empty() {
            None
        } else {
            let patterns: Vec<String> = keys.iter().map(|k| operator.entoken(k)).collect();
            let automaton = AhoCorasick::builder()
                .match_kind(MatchKind::Standard)
                .build(&patterns)?;
            tracing::debug!(
                "Built matcher over {} keys ({} bytes of patterns)",
                patterns.len(),
                patterns.iter().map(String::len).sum::<usize>()
            );
            Some(automaton)
        };

        Ok(Self {
            automaton,
            keys,
            values,
            index,
        })
    }

    /// A replacer with no keys; substitution is the identity.
    pub fn empty() -> Self {
        Self {
            automaton: None,
            keys: Vec::new(),
            values: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if the key is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up the value of a key.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.values[i].as_str())
    }

    /// Replaces every accepted match in a single pass over the text.
    pub fn replace(&self, text: &str) -> String {
        let accepted = self.accepted(text);
        if accepted.is_empty() {
            return text.to_string();
        }

        let mut output = String::with_capacity(text.len() + text.len() / 4);
        let mut last = 0;
        for candidate in &accepted {
            output.push_str(&text[last..candidate.start]);
            output.push_str(&self.values[candidate.pattern]);
            last = candidate.end;
        }
        output.push_str(&text[last..]);
        output
    }

    /// Returns the matches `replace` would substitute, in text order.
    pub fn matches(&self, text: &str) -> Vec<Reference> {
        self.accepted(text)
            .into_iter()
            .map(|c| Reference {
                start: c.start,
                end: c.end,
                key: self.keys[c.pattern].clone(),
            })
            .collect()
    }

    /// Returns delimited references whose key is not defined.
    pub fn unresolved(&self, text: &str, operator: &SigilOperator) -> Vec<Reference> {
        operator
            .references(text)
            .into_iter()
            .filter(|r| !self.contains_key(&r.key))
            .collect()
    }

    fn accepted(&self, text: &str) -> Vec<Candidate> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };

        let mut candidates: Vec<Candidate> = automaton
            .find_overlapping_iter(text)
            .filter(|m| is_whole_word(text, m.start(), m.end()))
            .map(|m| Candidate {
                start: m.start(),
                end: m.end(),
                pattern: m.pattern().as_usize(),
            })
            .collect();

        candidates.sort_unstable_by_key(|c| (c.start, c.pattern));

        let mut accepted = Vec::with_capacity(candidates.len());
        let mut cursor = 0;
        for candidate in candidates {
            if candidate.start >= cursor {
                cursor = candidate.end;
                accepted.push(candidate);
            }
        }
        accepted
    }
}

/// Word constituents for whole-word matching.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Checks that the span is not glued to a word on either side.
fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
