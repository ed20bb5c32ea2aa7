//! Error types for the rendering pipeline.
//!
//! [`RenderError`] covers the failure modes of a render cycle. Hook contract
//! violations and uncaught component errors abort the cycle and leave the
//! previously committed tree (and its frame) in place; layout style problems
//! are non-fatal and recorded while the render continues.

use thiserror::Error;

/// Errors produced while rendering an element tree.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A hook function was called with no component render in progress.
    #[error("hook called outside of a component render")]
    HooksOutsideRender,

    /// The sequence of hook calls changed between renders of a component.
    #[error("hook order changed between renders of `{component}` at slot {index}")]
    HookOrderViolation {
        /// Name of the component whose hook sequence diverged.
        component: String,
        /// Zero-based slot index where the mismatch was detected.
        index: usize,
    },

    /// A component function returned an error during render.
    #[error("component `{component}` failed to render: {message}")]
    ComponentRenderError {
        /// Name of the failing component.
        component: String,
        /// Human-readable failure description.
        message: String,
    },

    /// A style property could not be applied to the layout engine.
    ///
    /// Non-fatal: the offending property is dropped and a default substituted.
    #[error("layout style rejected: {message}")]
    LayoutAdapterError { message: String },
}

impl RenderError {
    /// Convenience constructor for component failures.
    pub fn component(name: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::ComponentRenderError {
            component: name.into(),
            message: message.into(),
        }
    }
}
