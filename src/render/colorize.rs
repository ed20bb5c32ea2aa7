//! Color and modifier application as SGR escape sequences.
//!
//! Color strings are either named colors or `#rrggbb` / `#rgb` hex values.
//! Styled text is produced as `open + text + close` pairs so the output
//! buffer can track style state per cell.

use crate::style::TextStyle;

/// Whether a color applies to the foreground or the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Foreground,
    Background,
}

impl ColorTarget {
    fn offset(self) -> u16 {
        match self {
            ColorTarget::Foreground => 0,
            ColorTarget::Background => 10,
        }
    }

    fn close(self) -> &'static str {
        match self {
            ColorTarget::Foreground => "\u{1b}[39m",
            ColorTarget::Background => "\u{1b}[49m",
        }
    }
}

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Base SGR code (foreground form) for a named color.
///
/// Case-insensitive. Supports the classic eight, `gray`/`grey`, and
/// `bright_*` variants.
fn named_code(name: &str) -> Option<u16> {
    match name.to_ascii_lowercase().as_str() {
        "black" => Some(30),
        "red" => Some(31),
        "green" => Some(32),
        "yellow" => Some(33),
        "blue" => Some(34),
        "magenta" => Some(35),
        "cyan" => Some(36),
        "white" => Some(37),
        "gray" | "grey" | "bright_black" => Some(90),
        "bright_red" => Some(91),
        "bright_green" => Some(92),
        "bright_yellow" => Some(93),
        "bright_blue" => Some(94),
        "bright_magenta" => Some(95),
        "bright_cyan" => Some(96),
        "bright_white" => Some(97),
        _ => None,
    }
}

/// Parse a hex color (without the leading `#`). Supports `rrggbb` and `rgb`.
fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            // Expand: 0xA -> 0xAA
            Some((r * 16 + r, g * 16 + g, b * 16 + b))
        }
        _ => None,
    }
}

/// The opening SGR sequence for a color string, or `None` if unparseable.
pub fn color_open(color: &str, target: ColorTarget) -> Option<String> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let (r, g, b) = parse_hex(hex)?;
        let base = 38 + target.offset();
        return Some(format!("\u{1b}[{base};2;{r};{g};{b}m"));
    }
    let code = named_code(color)? + target.offset();
    Some(format!("\u{1b}[{code}m"))
}

/// Wrap `text` in the open/close pair for `color`.
///
/// Unparseable or absent colors leave the text unchanged.
pub fn colorize(text: &str, color: Option<&str>, target: ColorTarget) -> String {
    let Some(open) = color.and_then(|c| color_open(c, target)) else {
        return text.to_string();
    };
    format!("{open}{text}{}", target.close())
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Wrap `text` in a dim/undim pair.
pub fn dim_text(text: &str) -> String {
    format!("\u{1b}[2m{text}\u{1b}[22m")
}

/// Apply the modifier flags of a [`TextStyle`] around `text`.
pub fn apply_modifiers(text: &str, style: &TextStyle) -> String {
    // (open, close) pairs, innermost last.
    const PAIRS: [(&str, &str); 6] = [
        ("\u{1b}[1m", "\u{1b}[22m"),
        ("\u{1b}[2m", "\u{1b}[22m"),
        ("\u{1b}[3m", "\u{1b}[23m"),
        ("\u{1b}[4m", "\u{1b}[24m"),
        ("\u{1b}[7m", "\u{1b}[27m"),
        ("\u{1b}[9m", "\u{1b}[29m"),
    ];
    let flags = [
        style.bold,
        style.dim,
        style.italic,
        style.underline,
        style.inverse,
        style.strikethrough,
    ];
    let mut out = text.to_string();
    for (i, on) in flags.iter().enumerate() {
        if *on {
            let (open, close) = PAIRS[i];
            out = format!("{open}{out}{close}");
        }
    }
    out
}
