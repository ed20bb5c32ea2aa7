//! Immutable element descriptors.
//!
//! An [`Element`] describes what should be rendered: a host box or text
//! node, a function component, a context provider, or a raw text run.
//! Elements carry no state or lifecycle — the reconciler materializes them
//! into fibers. Construction uses builder methods so trees read top-down:
//!
//! ```
//! use quill_tui::element::Element;
//! use quill_tui::style::{BorderKind, Style};
//!
//! let tree = Element::container()
//!     .with_style(Style::new().with_border(BorderKind::Single))
//!     .with_child(Element::text().with_text("hello"));
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::error::RenderError;
use crate::style::Style;

/// A function component: pure function from props to an element.
///
/// Plain `fn` pointers give components a stable, comparable identity — the
/// reconciler reuses a fiber only when the pointer matches.
pub type ComponentFn = fn(&Props) -> Result<Element, RenderError>;

/// Per-line text transform applied when painting a text node.
/// Receives the line content and its index within the node.
pub type Transform = Rc<dyn Fn(&str, usize) -> String>;

/// Error-boundary fallback: maps a descendant's render error to a
/// replacement element for this node's children.
pub type Fallback = Rc<dyn Fn(&RenderError) -> Element>;

// ---------------------------------------------------------------------------
// Element kinds
// ---------------------------------------------------------------------------

/// The two host node types understood by layout and paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostTag {
    /// A flexbox container.
    Box,
    /// A text node; its raw-text descendants are squashed, measured, and
    /// wrapped to the computed width.
    Text,
}

/// What an element is.
#[derive(Clone)]
pub enum ElementKind {
    Host(HostTag),
    Component {
        render: ComponentFn,
        name: &'static str,
    },
    Provider {
        ctx_id: u64,
        value: Rc<dyn Any>,
    },
    /// A raw text run. Only meaningful below a [`HostTag::Text`] node.
    Raw(String),
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Host(tag) => write!(f, "Host({tag:?})"),
            ElementKind::Component { name, .. } => write!(f, "Component({name})"),
            ElementKind::Provider { ctx_id, .. } => write!(f, "Provider(ctx {ctx_id})"),
            ElementKind::Raw(s) => write!(f, "Raw({s:?})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// A loosely typed prop value for the component prop bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Int(v as i64)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Float(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

/// Properties carried by an element: style, children, a named value bag,
/// an optional per-line text transform, and an optional error-boundary
/// fallback.
#[derive(Clone, Default)]
pub struct Props {
    pub style: Style,
    pub children: Vec<Element>,
    pub values: BTreeMap<String, PropValue>,
    pub transform: Option<Transform>,
    pub fallback: Option<Fallback>,
}

impl Props {
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(PropValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(PropValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Shallow prop comparison.
    ///
    /// Children are excluded (they are reconciled structurally). Transforms
    /// compare by pointer identity.
    pub fn shallow_eq(&self, other: &Props) -> bool {
        self.style == other.style
            && self.values == other.values
            && transform_eq(&self.transform, &other.transform)
    }
}

fn transform_eq(a: &Option<Transform>, b: &Option<Transform>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("style", &self.style)
            .field("children", &self.children.len())
            .field("values", &self.values)
            .field("transform", &self.transform.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// An immutable description of one node in the UI tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub props: Props,
    pub key: Option<String>,
}

impl Element {
    fn with_kind(kind: ElementKind) -> Self {
        Self {
            kind,
            props: Props::default(),
            key: None,
        }
    }

    /// A flexbox container node.
    pub fn container() -> Self {
        Self::with_kind(ElementKind::Host(HostTag::Box))
    }

    /// A text node. Add content with [`Element::with_text`] or raw children.
    pub fn text() -> Self {
        Self::with_kind(ElementKind::Host(HostTag::Text))
    }

    /// A raw text run (a child of a text node).
    pub fn raw(content: impl Into<String>) -> Self {
        Self::with_kind(ElementKind::Raw(content.into()))
    }

    /// A function component.
    pub fn component(name: &'static str, render: ComponentFn) -> Self {
        Self::with_kind(ElementKind::Component { render, name })
    }

    /// A context provider making `value` visible to `use_context` in the
    /// subtree.
    pub fn provider<T: Clone + 'static>(ctx: &Context<T>, value: T) -> Self {
        Self::with_kind(ElementKind::Provider {
            ctx_id: ctx.id(),
            value: Rc::new(value),
        })
    }

    /// Set the style (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.props.style = style;
        self
    }

    /// Set the reconciliation key (builder).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append one child (builder).
    pub fn with_child(mut self, child: Element) -> Self {
        self.props.children.push(child);
        self
    }

    /// Append several children (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.props.children.extend(children);
        self
    }

    /// Append a raw text child (builder shorthand for text nodes).
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(Element::raw(content))
    }

    /// Set a named prop value (builder).
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.values.insert(key.into(), value.into());
        self
    }

    /// Set a per-line text transform (builder).
    pub fn with_transform(mut self, f: impl Fn(&str, usize) -> String + 'static) -> Self {
        self.props.transform = Some(Rc::new(f));
        self
    }

    /// Make this element an error boundary: render errors from its subtree
    /// are caught and `f` supplies the replacement child (builder).
    pub fn with_fallback(mut self, f: impl Fn(&RenderError) -> Element + 'static) -> Self {
        self.props.fallback = Some(Rc::new(f));
        self
    }
}
