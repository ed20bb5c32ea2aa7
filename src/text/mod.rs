//! ANSI-aware text utilities.
//!
//! Everything that touches user-visible strings goes through this module:
//! tokenizing escape sequences, measuring display width (wide characters
//! count as two cells), slicing by column while preserving style codes, and
//! wrapping or truncating to a target width.

pub mod ansi;
pub mod width;
pub mod wrap;

pub use ansi::{slice_ansi, strip_ansi, tokenize, AnsiToken};
pub use width::{char_width, measure_text, string_width};
pub use wrap::wrap_text;
