//! Display width measurement.
//!
//! Widths are measured in terminal cells via `unicode-width`: East Asian
//! wide characters and emoji occupy two cells, zero-width characters none.
//! Escape sequences never contribute to width.

use unicode_width::UnicodeWidthChar;

use super::ansi::{tokenize, AnsiToken};

/// Display width of a single character in cells.
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Display width of a single line, ignoring escape sequences.
pub fn string_width(s: &str) -> usize {
    tokenize(s)
        .into_iter()
        .map(|t| match t {
            AnsiToken::Char(c) => char_width(c),
            AnsiToken::Sequence(_) => 0,
        })
        .sum()
}

/// Measure a block of text: `(widest line, line count)`.
///
/// This is the intrinsic size reported to the layout engine for text nodes.
pub fn measure_text(text: &str) -> (usize, usize) {
    if text.is_empty() {
        return (0, 0);
    }
    let mut widest = 0;
    let mut lines = 0;
    for line in text.split('\n') {
        widest = widest.max(string_width(line));
        lines += 1;
    }
    (widest, lines)
}
