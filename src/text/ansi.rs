//! ANSI escape sequence tokenization and style-preserving slicing.
//!
//! Only SGR sequences (`ESC [ ... m`) are tracked for style state; other CSI
//! sequences pass through tokenization but carry no style meaning.

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// One lexical unit of a styled string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnsiToken {
    /// A complete escape sequence, including the leading `ESC`.
    Sequence(String),
    /// A single visible character.
    Char(char),
}

/// Split a string into escape sequences and visible characters.
///
/// CSI sequences run from `ESC [` to the final byte in `@`..=`~`. A bare
/// `ESC` followed by anything else is emitted as a two-character sequence.
pub fn tokenize(s: &str) -> Vec<AnsiToken> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            tokens.push(AnsiToken::Char(c));
            continue;
        }
        let mut seq = String::from(c);
        match chars.peek() {
            Some('[') => {
                seq.push(chars.next().unwrap_or('['));
                for n in chars.by_ref() {
                    seq.push(n);
                    if ('\u{40}'..='\u{7e}').contains(&n) {
                        break;
                    }
                }
            }
            Some(_) => {
                if let Some(n) = chars.next() {
                    seq.push(n);
                }
            }
            None => {}
        }
        tokens.push(AnsiToken::Sequence(seq));
    }
    tokens
}

/// Remove all escape sequences, leaving only visible characters.
pub fn strip_ansi(s: &str) -> String {
    tokenize(s)
        .into_iter()
        .filter_map(|t| match t {
            AnsiToken::Char(c) => Some(c),
            AnsiToken::Sequence(_) => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SGR state tracking
// ---------------------------------------------------------------------------

/// Update the list of open SGR codes with one sequence.
///
/// Opening codes are pushed; closing codes (`0`, `39`, `49`, `22`..`29`)
/// remove the codes they terminate. Non-SGR sequences are ignored.
pub(crate) fn apply_sgr(active: &mut Vec<String>, seq: &str) {
    if !seq.ends_with('m') {
        return;
    }
    let Some(param) = first_param(seq) else {
        // `ESC [ m` is shorthand for reset.
        active.clear();
        return;
    };
    match param {
        0 => active.clear(),
        39 => active.retain(|c| !matches!(first_param(c), Some(30..=38) | Some(90..=97))),
        49 => active.retain(|c| !matches!(first_param(c), Some(40..=48) | Some(100..=107))),
        22 => active.retain(|c| !matches!(first_param(c), Some(1) | Some(2))),
        23 => active.retain(|c| first_param(c) != Some(3)),
        24 => active.retain(|c| first_param(c) != Some(4)),
        27 => active.retain(|c| first_param(c) != Some(7)),
        29 => active.retain(|c| first_param(c) != Some(9)),
        _ => active.push(seq.to_string()),
    }
}

fn first_param(seq: &str) -> Option<u16> {
    let body = seq.strip_prefix("\u{1b}[")?;
    let digits: String = body.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// The SGR codes still open at the end of `s`.
pub(crate) fn open_codes(s: &str) -> Vec<String> {
    let mut active = Vec::new();
    for tok in tokenize(s) {
        if let AnsiToken::Sequence(seq) = tok {
            apply_sgr(&mut active, &seq);
        }
    }
    active
}

// ---------------------------------------------------------------------------
// Slicing
// ---------------------------------------------------------------------------

/// Slice a styled string by display column, preserving style codes.
///
/// Returns the content covering columns `[from, to)`. Codes opened before
/// the slice are re-emitted at its start; codes still open at its end are
/// closed with a reset. A wide character straddling either boundary is
/// dropped entirely.
pub fn slice_ansi(s: &str, from: usize, to: usize) -> String {
    use super::width::char_width;

    let mut out = String::new();
    let mut active: Vec<String> = Vec::new();
    let mut col = 0usize;
    let mut visible = false;

    for tok in tokenize(s) {
        match tok {
            AnsiToken::Sequence(seq) => {
                if visible && col < to {
                    out.push_str(&seq);
                }
                apply_sgr(&mut active, &seq);
            }
            AnsiToken::Char(c) => {
                let w = char_width(c);
                if col >= from && col + w <= to {
                    if !visible {
                        for code in &active {
                            out.push_str(code);
                        }
                        visible = true;
                    }
                    out.push(c);
                }
                col += w;
            }
        }
    }

    if !open_codes(&out).is_empty() {
        out.push_str("\u{1b}[0m");
    }
    out
}
