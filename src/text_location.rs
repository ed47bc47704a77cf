//! Text location tracking for error reporting and reference listings.

use std::fmt;
use std::path::PathBuf;

/// Represents a location within a text file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    /// The file path (if known).
    pub filename: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, counted in characters).
    pub column: usize,
}

impl TextLocation {
    /// Creates a new TextLocation.
    pub fn new(filename: Option<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            filename,
            line,
            column,
        }
    }

    /// Creates a TextLocation with only line information.
    pub fn line_only(line: usize) -> Self {
        Self {
            filename: None,
            line,
            column: 1,
        }
    }

    /// Computes the line and column of a byte offset within `text`.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self::new(None, line, column)
    }

    /// Returns a new location with updated filename.
    pub fn with_filename(mut self, filename: PathBuf) -> Self {
        self.filename = Some(filename);
        self
    }
}

impl Default for TextLocation {
    fn default() -> Self {
        Self {
            filename: None,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.column),
            None => write!(f, "line {}:{}", self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_filename() {
        let loc = TextLocation::new(Some(PathBuf::from("chapter.md")), 10, 5);
        assert_eq!(format!("{}", loc), "chapter.md:10:5");
    }

    #[test]
    fn test_display_without_filename() {
        let loc = TextLocation::new(None, 10, 5);
        assert_eq!(format!("{}", loc), "line 10:5");
    }

    #[test]
    fn test_from_offset() {
        let text = "first\nsecond {{x}}\n";
        let loc = TextLocation::from_offset(text, 13);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 8);

        let start = TextLocation::from_offset(text, 0);
        assert_eq!((start.line, start.column), (1, 1));
    }

    #[test]
    fn test_from_offset_multibyte() {
        let text = "héllo {{x}}";
        // 'é' is two bytes; the token starts at byte 7, character column 7.
        let loc = TextLocation::from_offset(text, 7);
        assert_eq!((loc.line, loc.column), (1, 7));
    }
}
