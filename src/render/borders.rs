//! Border glyph sets and border painting.

use crate::style::{Border, BorderKind};

use super::colorize::{colorize, dim_text, ColorTarget};
use super::output::Output;

/// The glyphs for one border style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub top: char,
    pub bottom: char,
    pub left: char,
    pub right: char,
}

/// Glyph table for a [`BorderKind`].
pub fn border_chars(kind: BorderKind) -> BorderChars {
    match kind {
        BorderKind::Single => BorderChars {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            top: '─',
            bottom: '─',
            left: '│',
            right: '│',
        },
        BorderKind::Double => BorderChars {
            top_left: '╔',
            top_right: '╗',
            bottom_left: '╚',
            bottom_right: '╝',
            top: '═',
            bottom: '═',
            left: '║',
            right: '║',
        },
        BorderKind::Round => BorderChars {
            top_left: '╭',
            top_right: '╮',
            bottom_left: '╰',
            bottom_right: '╯',
            top: '─',
            bottom: '─',
            left: '│',
            right: '│',
        },
        BorderKind::Bold => BorderChars {
            top_left: '┏',
            top_right: '┓',
            bottom_left: '┗',
            bottom_right: '┛',
            top: '━',
            bottom: '━',
            left: '┃',
            right: '┃',
        },
        BorderKind::SingleDouble => BorderChars {
            top_left: '╓',
            top_right: '╖',
            bottom_left: '╙',
            bottom_right: '╜',
            top: '─',
            bottom: '─',
            left: '║',
            right: '║',
        },
        BorderKind::DoubleSingle => BorderChars {
            top_left: '╒',
            top_right: '╕',
            bottom_left: '╘',
            bottom_right: '╛',
            top: '═',
            bottom: '═',
            left: '│',
            right: '│',
        },
        BorderKind::Classic => BorderChars {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            top: '-',
            bottom: '-',
            left: '|',
            right: '|',
        },
    }
}

fn style_edge(text: String, color: Option<&str>, dim: bool) -> String {
    let colored = colorize(&text, color, ColorTarget::Foreground);
    if dim {
        dim_text(&colored)
    } else {
        colored
    }
}

/// Paint a border ring on the box `(x, y, width, height)`.
///
/// Hidden edges are skipped; horizontal runs shrink to fit the visible
/// vertical edges. Per-edge color and dim settings override the whole-border
/// ones.
pub fn render_border(out: &mut Output, x: i32, y: i32, width: i32, height: i32, border: &Border) {
    if width <= 0 || height <= 0 {
        return;
    }
    let chars = border_chars(border.kind);

    let top_color = border.top_color.as_deref().or(border.color.as_deref());
    let bottom_color = border.bottom_color.as_deref().or(border.color.as_deref());
    let left_color = border.left_color.as_deref().or(border.color.as_deref());
    let right_color = border.right_color.as_deref().or(border.color.as_deref());

    let top_dim = border.top_dim.unwrap_or(border.dim);
    let bottom_dim = border.bottom_dim.unwrap_or(border.dim);
    let left_dim = border.left_dim.unwrap_or(border.dim);
    let right_dim = border.right_dim.unwrap_or(border.dim);

    let mut run_width = width;
    if border.left {
        run_width -= 1;
    }
    if border.right {
        run_width -= 1;
    }
    let run_width = run_width.max(0) as usize;

    if border.top {
        let mut line = String::new();
        if border.left {
            line.push(chars.top_left);
        }
        line.extend(std::iter::repeat(chars.top).take(run_width));
        if border.right {
            line.push(chars.top_right);
        }
        out.write(x, y, &style_edge(line, top_color, top_dim));
    }

    let mut side_height = height;
    if border.top {
        side_height -= 1;
    }
    if border.bottom {
        side_height -= 1;
    }
    let side_y = y + if border.top { 1 } else { 0 };

    if border.left && side_height > 0 {
        let column = vec![chars.left.to_string(); side_height as usize].join("\n");
        out.write(x, side_y, &style_edge(column, left_color, left_dim));
    }

    if border.right && side_height > 0 {
        let column = vec![chars.right.to_string(); side_height as usize].join("\n");
        out.write(x + width - 1, side_y, &style_edge(column, right_color, right_dim));
    }

    if border.bottom && height > 1 {
        let mut line = String::new();
        if border.left {
            line.push(chars.bottom_left);
        }
        line.extend(std::iter::repeat(chars.bottom).take(run_width));
        if border.right {
            line.push(chars.bottom_right);
        }
        out.write(x, y + height - 1, &style_edge(line, bottom_color, bottom_dim));
    }
}
