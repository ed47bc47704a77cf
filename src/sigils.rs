//! Sigil operator: brackets definition keys with delimiters.

use regex::Regex;

use crate::config::Sigils;
use crate::errors::Result;
use crate::text_location::TextLocation;

/// An occurrence of a delimited key inside document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// The key with delimiters removed.
    pub key: String,
}

impl Reference {
    /// Line and column of the reference within `text`.
    pub fn location(&self, text: &str) -> TextLocation {
        TextLocation::from_offset(text, self.start)
    }
}

/// Adds and removes sigils around definition keys.
///
/// Constructed once per configuration; every operation is pure.
#[derive(Debug, Clone)]
pub struct SigilOperator {
    sigils: Sigils,
    /// Non-greedy match of a delimited key on a single line.
    pattern: Regex,
}

impl SigilOperator {
    /// Creates an operator for the given delimiters.
    pub fn new(sigils: Sigils) -> Result<Self> {
        sigils.validate()?;
        let pattern = Regex::new(&format!(
            "{}([^\\n]*?){}",
            regex::escape(&sigils.began),
            regex::escape(&sigils.ended)
        ))?;
        Ok(Self { sigils, pattern })
    }

    /// Returns the configured delimiters.
    pub fn sigils(&self) -> &Sigils {
        &self.sigils
    }

    /// Brackets the key with the delimiters.
    pub fn entoken(&self, key: &str) -> String {
        let mut token =
            String::with_capacity(key.len() + self.sigils.began.len() + self.sigils.ended.len());
        token.push_str(&self.sigils.began);
        token.push_str(key);
        token.push_str(&self.sigils.ended);
        token
    }

    /// Strips the delimiters from a token.
    ///
    /// Only checks that the token is longer than both delimiters together,
    /// not that the delimiters are actually present. Shorter tokens are
    /// returned unchanged.
    pub fn detoken<'a>(&self, token: &'a str) -> &'a str {
        let began = self.sigils.began.len();
        let ended = self.sigils.ended.len();

        if token.len() > began + ended
            && token.is_char_boundary(began)
            && token.is_char_boundary(token.len() - ended)
        {
            &token[began..token.len() - ended]
        } else {
            token
        }
    }

    /// Finds every delimited span in the text, whether or not it is defined.
    pub fn references(&self, text: &str) -> Vec<Reference> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let key = caps.get(1)?;
                Some(Reference {
                    start: whole.start(),
                    end: whole.end(),
                    key: key.as_str().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator() -> SigilOperator {
        SigilOperator::new(Sigils::default()).unwrap()
    }

    #[test]
    fn test_entoken() {
        assert_eq!(operator().entoken("a.b"), "{{a.b}}");
    }

    #[test]
    fn test_round_trip() {
        let op = operator();
        for key in ["a", "a.b", "book.author.name", "ünïcödé", "x y", "}}"] {
            assert_eq!(op.detoken(&op.entoken(key)), key);
        }
    }

    #[test]
    fn test_round_trip_asymmetric_sigils() {
        let op = SigilOperator::new(Sigils::new("$", "$$")).unwrap();
        assert_eq!(op.entoken("k"), "$k$$");
        assert_eq!(op.detoken("$k$$"), "k");
    }

    #[test]
    fn test_detoken_short_token_unchanged() {
        let op = operator();
        assert_eq!(op.detoken("{{}}"), "{{}}");
        assert_eq!(op.detoken("ab"), "ab");
        assert_eq!(op.detoken(""), "");
    }

    #[test]
    fn test_detoken_does_not_check_delimiters() {
        assert_eq!(operator().detoken("abcdef"), "cd");
    }

    #[test]
    fn test_rejects_empty_sigils() {
        assert!(SigilOperator::new(Sigils::new("", "}}")).is_err());
    }

    #[test]
    fn test_references() {
        let text = "Hi {{user.name}}, see {{missing}} and {{ a }}.\n{{line\nbreak}}";
        let refs = operator().references(text);

        let keys: Vec<_> = refs.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["user.name", "missing", " a "]);
        assert_eq!(&text[refs[0].start..refs[0].end], "{{user.name}}");
        assert_eq!(refs[1].location(text).column, 23);
    }
}
