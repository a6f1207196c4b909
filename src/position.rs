//! Grapheme & position primitives (component A).
//!
//! All positions carried on tokens and nodes are `(lineNumber, lineCodeUnit)`
//! pairs, zero-based, with `lineCodeUnit` counting UTF-16-equivalent code
//! units within the line -- the wire format editor clients report cursor
//! positions in (`spec.md` §6). Grapheme-cluster columns are derived on
//! demand rather than stored, since most consumers never need them.

use unicode_segmentation::UnicodeSegmentation;

/// An absolute position within a document: a zero-based line number and a
/// UTF-16-code-unit offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line_number: u32,
    pub line_code_unit: u32,
}

impl Position {
    pub fn new(line_number: u32, line_code_unit: u32) -> Self {
        Self {
            line_number,
            line_code_unit,
        }
    }
}

/// Counts the UTF-16 code units a `str` slice would occupy.
pub fn utf16_len(s: &str) -> u32 {
    s.chars().map(char::len_utf16).sum::<usize>() as u32
}

/// Computes the grapheme-cluster index (the "column number" editors show to
/// humans) of the code-unit offset `line_code_unit` within `line`.
///
/// `line_code_unit` is assumed to fall on a code-unit boundary that is also
/// a grapheme boundary, which is guaranteed for offsets produced by the
/// lexer (it only ever advances by whole tokens).
pub fn column_number(line: &str, line_code_unit: u32) -> u32 {
    let mut code_units = 0u32;
    let mut column = 0u32;
    for grapheme in line.graphemes(true) {
        if code_units >= line_code_unit {
            break;
        }
        code_units += utf16_len(grapheme);
        column += 1;
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_column_matches_code_unit() {
        assert_eq!(column_number("hello", 3), 3);
    }

    #[test]
    fn grapheme_cluster_counts_as_one_column() {
        // "e" + combining acute accent is one grapheme, two chars, two code units.
        let line = "e\u{0301}xyz";
        assert_eq!(column_number(line, 0), 0);
        assert_eq!(column_number(line, 2), 1);
        assert_eq!(column_number(line, 3), 2);
    }

    #[test]
    fn astral_plane_char_counts_as_two_code_units() {
        // U+1F600 is represented as a UTF-16 surrogate pair.
        let line = "\u{1F600}a";
        assert_eq!(utf16_len("\u{1F600}"), 2);
        assert_eq!(column_number(line, 2), 1);
    }
}
