//! Rendering pipeline: output buffer, borders, painting, terminal writer.

pub mod borders;
pub mod colorize;
pub mod output;
pub(crate) mod painter;
pub mod writer;

pub use borders::{border_chars, BorderChars};
pub use colorize::{color_open, colorize, ColorTarget};
pub use output::Output;
pub use writer::{FrameWriter, WriteMode};
