//! # quill-tui
//!
//! A component-based terminal UI rendering core. Applications describe
//! their interface as a tree of elements built from function components,
//! flexbox containers, and styled text; quill-tui reconciles that tree
//! against the previous one, lays it out with [taffy](https://crates.io/crates/taffy),
//! paints a styled frame string, and rewrites only the terminal lines that
//! changed.
//!
//! ## Core Systems
//!
//! - **[`element`]** — Immutable element descriptors: containers, text, components, providers
//! - **[`hooks`]** — `use_state`, `use_effect`, `use_context`, `use_memo` hook runtime
//! - **[`reconciler`]** — Fiber tree diffing, commit, and the render scheduler
//! - **[`layout`]** — Taffy flexbox adapter with text measurement
//! - **[`style`]** — Layout and paint properties applied per element
//! - **[`text`]** — ANSI-aware width measurement, slicing, wrapping
//! - **[`render`]** — Styled output buffer, borders, painter, incremental terminal writer
//! - **[`app`]** — Application shell: writer, throttle, input events
//!
//! ```no_run
//! use quill_tui::app::{App, AppConfig};
//! use quill_tui::element::Element;
//! use quill_tui::style::{BorderKind, Style};
//!
//! let mut app = App::stdout(AppConfig::new());
//! let ui = Element::container()
//!     .with_style(Style::new().with_border(BorderKind::Round))
//!     .with_child(Element::text().with_text("hello"));
//! app.render(ui).unwrap();
//! ```

// Foundation
pub mod context;
pub mod error;
pub mod style;

// Element model and hooks
pub mod element;
pub mod hooks;

// Reconciliation and layout
mod fiber;
pub mod layout;
pub mod reconciler;

// Text and rendering
pub mod render;
pub mod text;

// Application
pub mod app;
pub mod input;
pub mod throttle;
