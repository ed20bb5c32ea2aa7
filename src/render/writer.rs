//! Frame output to the terminal.
//!
//! [`FrameWriter`] repaints a region of the terminal in place: it keeps the
//! previously written frame, moves the cursor back over it, and rewrites.
//! In incremental mode only the lines that changed are cleared and
//! rewritten; unchanged lines are skipped with a cursor move. An identical
//! frame writes nothing at all.

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

/// How frames replace their predecessor on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Erase the previous frame and write the whole new one.
    Standard,
    /// Rewrite only the lines that changed.
    #[default]
    Incremental,
}

pub struct FrameWriter<W: Write> {
    sink: W,
    mode: WriteMode,
    prev_frame: Option<String>,
    prev_lines: Vec<String>,
    cursor_hidden: bool,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(sink: W, mode: WriteMode) -> Self {
        Self {
            sink,
            mode,
            prev_frame: None,
            prev_lines: Vec::new(),
            cursor_hidden: false,
        }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Write `frame`, replacing the previous one in place.
    pub fn render(&mut self, frame: &str) -> io::Result<()> {
        if self.prev_frame.as_deref() == Some(frame) {
            return Ok(());
        }
        if !self.cursor_hidden {
            queue!(self.sink, cursor::Hide)?;
            self.cursor_hidden = true;
        }
        match self.mode {
            WriteMode::Incremental => self.write_incremental(frame)?,
            WriteMode::Standard => self.write_standard(frame)?,
        }
        self.prev_frame = Some(frame.to_string());
        self.prev_lines = frame.split('\n').map(str::to_string).collect();
        self.sink.flush()
    }

    fn write_incremental(&mut self, frame: &str) -> io::Result<()> {
        let new_lines: Vec<&str> = frame.split('\n').collect();
        if !self.prev_lines.is_empty() {
            queue!(
                self.sink,
                cursor::MoveToPreviousLine(self.prev_lines.len() as u16)
            )?;
        }
        for (i, line) in new_lines.iter().enumerate() {
            if self.prev_lines.get(i).map(String::as_str) == Some(*line) {
                queue!(self.sink, cursor::MoveToNextLine(1))?;
            } else {
                queue!(
                    self.sink,
                    terminal::Clear(terminal::ClearType::CurrentLine),
                    cursor::MoveToColumn(0),
                    style::Print(line),
                    style::Print("\r\n")
                )?;
            }
        }
        // The previous frame was taller: blank the leftover lines.
        let extra = self.prev_lines.len().saturating_sub(new_lines.len());
        for _ in 0..extra {
            queue!(
                self.sink,
                terminal::Clear(terminal::ClearType::CurrentLine),
                cursor::MoveToNextLine(1)
            )?;
        }
        if extra > 0 {
            queue!(self.sink, cursor::MoveToPreviousLine(extra as u16))?;
        }
        Ok(())
    }

    fn write_standard(&mut self, frame: &str) -> io::Result<()> {
        if !self.prev_lines.is_empty() {
            queue!(
                self.sink,
                cursor::MoveToPreviousLine(self.prev_lines.len() as u16),
                terminal::Clear(terminal::ClearType::FromCursorDown)
            )?;
        }
        queue!(self.sink, style::Print(frame), style::Print("\r\n"))
    }

    /// Erase the current frame from the terminal.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.prev_lines.is_empty() {
            return Ok(());
        }
        queue!(
            self.sink,
            cursor::MoveToPreviousLine(self.prev_lines.len() as u16),
            terminal::Clear(terminal::ClearType::FromCursorDown)
        )?;
        self.prev_frame = None;
        self.prev_lines.clear();
        self.sink.flush()
    }

    /// Rewrite `frame` from scratch below the current cursor position.
    /// For use after foreign output broke the in-place region.
    pub fn sync(&mut self, frame: &str) -> io::Result<()> {
        self.prev_frame = None;
        self.prev_lines.clear();
        self.render(frame)
    }

    /// Leave the frame in place, restore the cursor, and forget state.
    pub fn done(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            queue!(self.sink, cursor::Show)?;
            self.cursor_hidden = false;
        }
        self.prev_frame = None;
        self.prev_lines.clear();
        self.sink.flush()
    }
}
