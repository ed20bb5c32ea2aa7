//! The taffy layout adapter.
//!
//! Wraps a [`TaffyTree`] whose node context carries text content for measure
//! calls. The reconciler owns the mapping from fibers to taffy nodes; the
//! adapter only creates, restyles, reparents, frees, and measures.

use taffy::prelude::*;
use taffy::TaffyTree;

use crate::error::RenderError;
use crate::style::{Style as NodeStyle, TextWrap};
use crate::text::{measure_text, wrap_text};

use super::resolve::resolve_style;

/// Text content attached to a taffy leaf for intrinsic measurement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextContext {
    pub content: String,
    pub wrap: TextWrap,
}

/// Computed placement of one node, in integer cells, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

pub(crate) struct LayoutAdapter {
    tree: TaffyTree<TextContext>,
    /// Nodes freed since construction. Exposed for leak assertions in tests.
    released: usize,
    errors: Vec<RenderError>,
}

impl LayoutAdapter {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            released: 0,
            errors: Vec::new(),
        }
    }

    /// Create the persistent root container sized to the terminal width.
    pub fn new_root(&mut self, width: u16) -> NodeId {
        let style = taffy::Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            size: Size {
                width: Dimension::from_length(width as f32),
                height: Dimension::AUTO,
            },
            ..Default::default()
        };
        self.tree
            .new_leaf(style)
            .expect("taffy node creation should not fail")
    }

    pub fn set_root_width(&mut self, root: NodeId, width: u16) {
        if let Ok(style) = self.tree.style(root) {
            let mut style = style.clone();
            style.size.width = Dimension::from_length(width as f32);
            let _ = self.tree.set_style(root, style);
        }
    }

    /// Create a leaf for a host node.
    pub fn new_node(&mut self, style: &NodeStyle) -> NodeId {
        let (resolved, errors) = resolve_style(style);
        self.record_errors(errors);
        self.tree
            .new_leaf(resolved)
            .expect("taffy node creation should not fail")
    }

    pub fn set_style(&mut self, node: NodeId, style: &NodeStyle) {
        let (resolved, errors) = resolve_style(style);
        self.record_errors(errors);
        let _ = self.tree.set_style(node, resolved);
    }

    /// Create a leaf for a text host. Text gets a width cap so it wraps to
    /// its container instead of measuring on one line and overflowing.
    pub fn new_text_node(&mut self, style: &NodeStyle) -> NodeId {
        let (resolved, errors) = resolve_style(style);
        self.record_errors(errors);
        self.tree
            .new_leaf(constrain_text(resolved))
            .expect("taffy node creation should not fail")
    }

    pub fn set_text_style(&mut self, node: NodeId, style: &NodeStyle) {
        let (resolved, errors) = resolve_style(style);
        self.record_errors(errors);
        let _ = self.tree.set_style(node, constrain_text(resolved));
    }

    /// Attach text content for measurement, marking the node dirty when the
    /// content actually changed.
    pub fn set_text(&mut self, node: NodeId, content: String, wrap: TextWrap) {
        let next = TextContext { content, wrap };
        if self.tree.get_node_context(node) == Some(&next) {
            return;
        }
        let _ = self.tree.set_node_context(node, Some(next));
        let _ = self.tree.mark_dirty(node);
    }

    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let _ = self.tree.set_children(parent, children);
    }

    /// Remove a node from the tree. Callers detach children first by
    /// re-assigning them or freeing them separately.
    pub fn free(&mut self, node: NodeId) {
        if self.tree.remove(node).is_ok() {
            self.released += 1;
        }
    }

    /// Run flexbox layout with text measurement against the terminal width.
    /// Height is unconstrained; frames grow downward.
    pub fn compute(&mut self, root: NodeId, width: u16) {
        let result = self.tree.compute_layout_with_measure(
            root,
            Size {
                width: AvailableSpace::Definite(width as f32),
                height: AvailableSpace::MaxContent,
            },
            |known, available, _node, context, _style| measure(known, available, context),
        );
        if let Err(err) = result {
            self.errors.push(RenderError::LayoutAdapterError {
                message: err.to_string(),
            });
        }
    }

    /// Computed placement of `node`, rounded to integer cells.
    pub fn layout_of(&self, node: NodeId) -> Region {
        match self.tree.layout(node) {
            Ok(layout) => Region {
                x: layout.location.x.round() as i32,
                y: layout.location.y.round() as i32,
                width: layout.size.width.round() as i32,
                height: layout.size.height.round() as i32,
            },
            Err(_) => Region::default(),
        }
    }

    pub fn take_errors(&mut self) -> Vec<RenderError> {
        std::mem::take(&mut self.errors)
    }

    #[cfg(test)]
    pub fn released_count(&self) -> usize {
        self.released
    }

    #[cfg(test)]
    pub fn total_node_count(&self) -> usize {
        self.tree.total_node_count()
    }

    fn record_errors(&mut self, errors: Vec<String>) {
        self.errors.extend(
            errors
                .into_iter()
                .map(|message| RenderError::LayoutAdapterError { message }),
        );
    }
}

/// Cap unconstrained text at the parent's width. Explicit width or
/// max-width settings win.
fn constrain_text(mut resolved: taffy::Style) -> taffy::Style {
    if resolved.size.width == Dimension::AUTO && resolved.max_size.width == Dimension::AUTO {
        resolved.max_size.width = Dimension::from_percent(1.0);
    }
    resolved
}

/// Intrinsic size of a text leaf under the given constraints.
fn measure(
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
    context: Option<&mut TextContext>,
) -> Size<f32> {
    let Some(ctx) = context else {
        return Size {
            width: known.width.unwrap_or(0.0),
            height: known.height.unwrap_or(0.0),
        };
    };
    if let (Some(w), Some(h)) = (known.width, known.height) {
        return Size {
            width: w,
            height: h,
        };
    }

    let budget = match (known.width, available.width) {
        (Some(w), _) => Some(w),
        (None, AvailableSpace::Definite(w)) => Some(w),
        (None, _) => None,
    };
    let fitted = match budget {
        Some(w) if w > 0.0 => wrap_text(&ctx.content, w.floor() as usize, ctx.wrap),
        _ => ctx.content.clone(),
    };
    let (widest, lines) = measure_text(&fitted);

    Size {
        width: known.width.unwrap_or(widest as f32),
        height: known.height.unwrap_or(lines as f32),
    }
}
