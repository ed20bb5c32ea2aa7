//! The styled virtual output buffer.
//!
//! [`Output`] is a 2D grid of styled cells that one paint pass fills and
//! [`Output::extract`] flattens into the frame string handed to the writer.
//! Style codes are tracked per cell, so horizontally clipped styled text
//! keeps its styling. Wide characters occupy two cells: the leading cell
//! holds the character, the trailing cell is a continuation marker.

use crate::text::ansi::{apply_sgr, tokenize, AnsiToken};
use crate::text::width::char_width;

// ---------------------------------------------------------------------------
// Cells and clip rectangles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    ch: char,
    /// Set on the leading cell of a two-column character.
    wide: bool,
    /// Set on the trailing cell of a two-column character.
    continuation: bool,
    /// SGR sequences active when this cell was written.
    codes: Vec<String>,
}

impl Cell {
    fn blank() -> Self {
        Cell {
            ch: ' ',
            wide: false,
            continuation: false,
            codes: Vec::new(),
        }
    }

    fn is_blank(&self) -> bool {
        self.ch == ' ' && !self.continuation && self.codes.is_empty()
    }
}

/// Half-open clip rectangle in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clip {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Clip {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    fn intersect(&self, other: Clip) -> Clip {
        Clip {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A styled character grid with a clip-rectangle stack.
pub struct Output {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
    clips: Vec<Clip>,
}

impl Output {
    /// Create a buffer of blank cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![Cell::blank(); width]; height],
            clips: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn bounds(&self) -> Clip {
        Clip {
            x1: 0,
            y1: 0,
            x2: self.width as i32,
            y2: self.height as i32,
        }
    }

    fn current_clip(&self) -> Clip {
        self.clips.last().copied().unwrap_or_else(|| self.bounds())
    }

    /// Push a clip rectangle; writes outside it (or any enclosing clip) are
    /// dropped per cell.
    pub fn push_clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let rect = Clip {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        };
        let combined = self.current_clip().intersect(rect);
        self.clips.push(combined);
    }

    pub fn pop_clip(&mut self) {
        self.clips.pop();
    }

    /// Write styled, possibly multi-line text with its top-left at `(x, y)`.
    ///
    /// Style codes embedded in `text` attach to the cells they precede.
    /// Cells outside the buffer or the active clip are dropped; a wide
    /// character is dropped entirely when either of its cells is clipped.
    pub fn write(&mut self, x: i32, y: i32, text: &str) {
        let clip = self.current_clip().intersect(self.bounds());
        for (line_idx, line) in text.split('\n').enumerate() {
            let row = y + line_idx as i32;
            let mut col = x;
            let mut active: Vec<String> = Vec::new();
            for tok in tokenize(line) {
                match tok {
                    AnsiToken::Sequence(seq) => apply_sgr(&mut active, &seq),
                    AnsiToken::Char(c) => {
                        let w = char_width(c).max(1) as i32;
                        let visible =
                            (0..w).all(|dx| clip.contains(col + dx, row));
                        if visible {
                            self.place(col, row, c, w == 2, &active);
                        }
                        col += w;
                    }
                }
            }
        }
    }

    fn place(&mut self, x: i32, y: i32, ch: char, wide: bool, codes: &[String]) {
        // Clear the other half of any wide character we partially overwrite.
        self.clear_partner(x, y);
        if wide {
            self.clear_partner(x + 1, y);
        }
        let row = &mut self.rows[y as usize];
        row[x as usize] = Cell {
            ch,
            wide,
            continuation: false,
            codes: codes.to_vec(),
        };
        if wide {
            row[(x + 1) as usize] = Cell {
                ch: ' ',
                wide: false,
                continuation: true,
                codes: codes.to_vec(),
            };
        }
    }

    fn clear_partner(&mut self, x: i32, y: i32) {
        let (xi, yi) = (x as usize, y as usize);
        let cell = &self.rows[yi][xi];
        if cell.continuation && xi > 0 {
            self.rows[yi][xi - 1] = Cell::blank();
        } else if cell.wide && xi + 1 < self.width {
            self.rows[yi][xi + 1] = Cell::blank();
        }
    }

    /// Flatten the buffer into `(frame, line_count)`.
    ///
    /// Each row becomes one line with trailing blank cells trimmed and style
    /// codes re-emitted only where they change between cells.
    pub fn extract(&self) -> (String, usize) {
        let mut lines = Vec::with_capacity(self.height);
        for row in &self.rows {
            lines.push(render_row(row));
        }
        (lines.join("\n"), self.height)
    }
}

fn render_row(row: &[Cell]) -> String {
    let last_significant = row.iter().rposition(|c| !c.is_blank());
    let Some(end) = last_significant else {
        return String::new();
    };

    let mut out = String::new();
    let mut active: &[String] = &[];
    for cell in &row[..=end] {
        if cell.continuation {
            continue;
        }
        if cell.codes.as_slice() != active {
            if !active.is_empty() {
                out.push_str("\u{1b}[0m");
            }
            for code in &cell.codes {
                out.push_str(code);
            }
            active = &cell.codes;
        }
        out.push(cell.ch);
    }
    if !active.is_empty() {
        out.push_str("\u{1b}[0m");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain_lines(out: &Output) -> Vec<String> {
        let (frame, _) = out.extract();
        frame
            .split('\n')
            .map(|l| crate::text::strip_ansi(l))
            .collect()
    }

    #[test]
    fn write_and_extract() {
        let mut out = Output::new(10, 2);
        out.write(2, 0, "hi");
        let (frame, lines) = out.extract();
        assert_eq!(lines, 2);
        assert_eq!(frame, "  hi\n");
    }

    #[test]
    fn multiline_write() {
        let mut out = Output::new(5, 3);
        out.write(0, 0, "ab\ncd");
        assert_eq!(plain_lines(&out), vec!["ab", "cd", ""]);
    }

    #[test]
    fn out_of_bounds_is_dropped() {
        let mut out = Output::new(4, 2);
        out.write(2, 0, "abcdef");
        out.write(0, 5, "zz");
        out.write(-1, 1, "xy");
        assert_eq!(plain_lines(&out), vec!["  ab", "y"]);
    }

    #[test]
    fn styled_cells_reemit_codes() {
        let mut out = Output::new(8, 1);
        out.write(0, 0, "a\u{1b}[31mbc\u{1b}[39md");
        let (frame, _) = out.extract();
        assert_eq!(frame, "a\u{1b}[31mbc\u{1b}[0md");
    }

    #[test]
    fn trailing_styled_cell_gets_reset() {
        let mut out = Output::new(4, 1);
        out.write(0, 0, "\u{1b}[44mab\u{1b}[49m");
        let (frame, _) = out.extract();
        assert_eq!(frame, "\u{1b}[44mab\u{1b}[0m");
    }

    #[test]
    fn clip_drops_outside_cells() {
        let mut out = Output::new(10, 3);
        out.push_clip(2, 1, 3, 1);
        out.write(0, 0, "top");
        out.write(0, 1, "abcdefgh");
        out.pop_clip();
        out.write(0, 2, "below");
        assert_eq!(plain_lines(&out), vec!["", "  cde", "below"]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut out = Output::new(10, 1);
        out.push_clip(0, 0, 6, 1);
        out.push_clip(4, 0, 6, 1);
        out.write(0, 0, "abcdefghij");
        assert_eq!(plain_lines(&out), vec!["    ef"]);
    }

    #[test]
    fn wide_char_occupies_two_cells() {
        let mut out = Output::new(6, 1);
        out.write(0, 0, "你a");
        let (frame, _) = out.extract();
        assert_eq!(frame, "你a");
    }

    #[test]
    fn wide_char_clipped_at_boundary_is_dropped() {
        let mut out = Output::new(6, 1);
        out.push_clip(0, 0, 1, 1);
        // Needs columns 0 and 1, but only column 0 is writable.
        out.write(0, 0, "你");
        out.pop_clip();
        assert_eq!(plain_lines(&out), vec![""]);
    }

    #[test]
    fn overwriting_half_a_wide_char_blanks_the_rest() {
        let mut out = Output::new(6, 1);
        out.write(0, 0, "你x");
        out.write(1, 0, "z");
        // The wide char loses both cells; 'z' lands at column 1.
        assert_eq!(plain_lines(&out), vec![" zx"]);
    }

    #[test]
    fn style_changes_between_cells_reset_first() {
        let mut out = Output::new(6, 1);
        out.write(0, 0, "\u{1b}[31ma\u{1b}[39m\u{1b}[34mb\u{1b}[39m");
        let (frame, _) = out.extract();
        assert_eq!(frame, "\u{1b}[31ma\u{1b}[0m\u{1b}[34mb\u{1b}[0m");
    }
}
