//! Flat properties parsing.
//!
//! Parses Java-style properties text such as
//!
//! ```text
//! # comment
//! app.name = Quill
//! app.tagline: write\tonce
//! long.value = first \
//!              second
//! ```
//!
//! into ordered key/value pairs.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, tag, take},
    character::complete::{none_of, one_of, space0},
    combinator::{opt, value},
};

use crate::errors::{DefmarkError, Result};
use crate::text_location::TextLocation;

/// A logical line: physical lines joined across trailing backslashes.
struct LogicalLine {
    /// Line number of the first physical line (1-indexed).
    line: usize,
    text: String,
}

/// Returns true if the line ends with an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Joins continuation lines; leading whitespace of a continuation is dropped.
fn logical_lines(input: &str) -> Vec<LogicalLine> {
    let mut result = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (index, raw) in input.lines().enumerate() {
        let physical = match pending {
            Some(_) => raw.trim_start(),
            None => raw,
        };

        let (body, more) = if continues(physical) {
            (&physical[..physical.len() - 1], true)
        } else {
            (physical, false)
        };

        let mut current = pending.take().unwrap_or(LogicalLine {
            line: index + 1,
            text: String::new(),
        });
        current.text.push_str(body);

        if more {
            pending = Some(current);
        } else {
            result.push(current);
        }
    }

    if let Some(last) = pending {
        result.push(last);
    }

    result
}

/// Escapes understood in keys and values; any other escaped character
/// stands for itself.
fn parse_escape(input: &str) -> IResult<&str, &str> {
    alt((
        value("\n", tag("n")),
        value("\t", tag("t")),
        value("\r", tag("r")),
        take(1usize),
    ))
    .parse(input)
}

/// Parse a key: everything up to an unescaped separator or whitespace.
fn parse_key(input: &str) -> IResult<&str, String> {
    escaped_transform(none_of("\\=: \t"), '\\', parse_escape).parse(input)
}

/// Parse the separator between key and value.
fn parse_separator(input: &str) -> IResult<&str, ()> {
    value((), (space0, opt(one_of("=:")), space0)).parse(input)
}

/// Parse a value: the rest of the logical line.
fn parse_value(input: &str) -> IResult<&str, String> {
    escaped_transform(none_of("\\"), '\\', parse_escape).parse(input)
}

/// Parse a single `key = value` entry.
fn parse_entry(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = space0(input)?;
    let (input, key) = parse_key(input)?;
    let (input, _) = parse_separator(input)?;
    let (input, val) = if input.is_empty() {
        (input, String::new())
    } else {
        parse_value(input)?
    };
    Ok((input, (key, val)))
}

/// Parses properties text into ordered key/value pairs.
///
/// Blank lines and lines starting with `#` or `!` are skipped. Later
/// duplicates are kept; the store resolves them in order.
pub fn parse_properties(input: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();

    for logical in logical_lines(input) {
        let trimmed = logical.text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let location = TextLocation::line_only(logical.line);
        let (rest, (key, val)) =
            parse_entry(&logical.text).map_err(|e| DefmarkError::Properties {
                location: location.clone(),
                message: e.to_string(),
            })?;

        if key.is_empty() {
            return Err(DefmarkError::Properties {
                location,
                message: "missing key before separator".to_string(),
            });
        }
        if !rest.is_empty() {
            return Err(DefmarkError::Properties {
                location,
                message: format!("unexpected trailing input: {:?}", rest),
            });
        }

        entries.push((key, val));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_separators() {
        let input = "a=1\nb = 2\nc:3\nd 4\n";
        assert_eq!(
            parse_properties(input).unwrap(),
            pairs(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")])
        );
    }

    #[test]
    fn test_comments_and_blanks() {
        let input = "# heading\n\n! bang comment\n  app.name = Quill\n";
        assert_eq!(
            parse_properties(input).unwrap(),
            pairs(&[("app.name", "Quill")])
        );
    }

    #[test]
    fn test_escapes() {
        let input = "path\\ name = C\\:\\\\docs\nmsg = line\\none\\ttab\n";
        assert_eq!(
            parse_properties(input).unwrap(),
            pairs(&[("path name", "C:\\docs"), ("msg", "line\none\ttab")])
        );
    }

    #[test]
    fn test_continuation() {
        let input = "long = first \\\n        second\nnext = x\n";
        assert_eq!(
            parse_properties(input).unwrap(),
            pairs(&[("long", "first second"), ("next", "x")])
        );
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(parse_properties("key=\n").unwrap(), pairs(&[("key", "")]));
        assert_eq!(parse_properties("lonely\n").unwrap(), pairs(&[("lonely", "")]));
    }

    #[test]
    fn test_missing_key() {
        let err = parse_properties("ok = 1\n= orphan\n").unwrap_err();
        match err {
            DefmarkError::Properties { location, .. } => assert_eq!(location.line, 2),
            other => panic!("Expected Properties error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        assert_eq!(
            parse_properties("a=1\na=2\n").unwrap(),
            pairs(&[("a", "1"), ("a", "2")])
        );
    }
}
