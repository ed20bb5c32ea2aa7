//! Wrapping and truncation to a target display width.
//!
//! Words are split on single spaces, which is safe for styled strings: SGR
//! sequences contain no spaces, so they stay attached to the word they
//! style. Hard breaks inside overlong words go through [`slice_ansi`] so
//! style codes survive the cut.

use crate::style::TextWrap;

use super::ansi::slice_ansi;
use super::width::string_width;

/// Fit `text` to `max_width` columns using the given mode.
///
/// `Wrap` word-wraps each input line onto additional lines; the truncate
/// modes reduce each overlong line to a single line with a `…` marker.
/// A `max_width` of zero leaves the text untouched.
pub fn wrap_text(text: &str, max_width: usize, mode: TextWrap) -> String {
    if max_width == 0 {
        return text.to_string();
    }
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| fit_line(line, max_width, mode))
        .collect();
    lines.join("\n")
}

fn fit_line(line: &str, max_width: usize, mode: TextWrap) -> String {
    if string_width(line) <= max_width {
        return line.to_string();
    }
    match mode {
        TextWrap::Wrap => wrap_line(line, max_width),
        TextWrap::TruncateEnd => {
            let keep = max_width.saturating_sub(1);
            format!("{}…", slice_ansi(line, 0, keep))
        }
        TextWrap::TruncateMiddle => {
            let w = string_width(line);
            let keep = max_width.saturating_sub(1);
            let left = keep / 2;
            let right = keep - left;
            format!(
                "{}…{}",
                slice_ansi(line, 0, left),
                slice_ansi(line, w - right, w)
            )
        }
        TextWrap::TruncateStart => {
            let w = string_width(line);
            let keep = max_width.saturating_sub(1);
            format!("…{}", slice_ansi(line, w - keep, w))
        }
    }
}

fn wrap_line(line: &str, max_width: usize) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in line.split(' ') {
        let word_width = string_width(word);
        if current_width == 0 {
            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                // Hard-break an overlong word into full-width chunks.
                let (rest, rest_width) = hard_break(word, word_width, max_width, &mut out);
                current = rest;
                current_width = rest_width;
            }
        } else if current_width + 1 + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            out.push(std::mem::take(&mut current));
            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                let (rest, rest_width) = hard_break(word, word_width, max_width, &mut out);
                current = rest;
                current_width = rest_width;
            }
        }
    }
    out.push(current);
    out.join("\n")
}

/// Emit full-width chunks of `word` into `out`, returning the final partial
/// chunk and its width so following words can share its line.
fn hard_break(
    word: &str,
    word_width: usize,
    max_width: usize,
    out: &mut Vec<String>,
) -> (String, usize) {
    let mut start = 0usize;
    while word_width - start > max_width {
        out.push(slice_ansi(word, start, start + max_width));
        start += max_width;
    }
    (slice_ansi(word, start, word_width), word_width - start)
}
