//! Fiber tree internals.
//!
//! A fiber is the mutable, stateful counterpart of an immutable
//! [`Element`](crate::element::Element): it owns the element's hook slots,
//! its layout node or raw-text holder, and its position in the tree via
//! child / sibling / parent links. Fibers live in a slotmap arena owned by
//! the reconciler core.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::element::{ComponentFn, HostTag, Props};
use crate::hooks::HookSlot;

new_key_type! {
    /// Arena key for one fiber.
    pub struct FiberId;
}

/// What a fiber materializes.
#[derive(Clone)]
pub(crate) enum FiberKind {
    /// The synthetic tree root.
    Root,
    Host(HostTag),
    Component {
        render: ComponentFn,
        name: &'static str,
    },
    Provider { ctx_id: u64 },
    /// A raw text run below a text host.
    Raw,
}

impl FiberKind {
    /// Whether two kinds describe the same node type for reconciliation.
    pub fn same_type(&self, other: &FiberKind) -> bool {
        match (self, other) {
            (FiberKind::Root, FiberKind::Root) => true,
            (FiberKind::Host(a), FiberKind::Host(b)) => a == b,
            (FiberKind::Component { render: a, .. }, FiberKind::Component { render: b, .. }) => {
                *a as usize == *b as usize
            }
            (FiberKind::Provider { ctx_id: a }, FiberKind::Provider { ctx_id: b }) => a == b,
            (FiberKind::Raw, FiberKind::Raw) => true,
            _ => false,
        }
    }
}

/// The backing object a committed fiber writes into.
#[derive(Clone)]
pub(crate) enum DomHandle {
    /// A taffy layout node (root and host fibers).
    Node(taffy::NodeId),
    /// A raw text holder, mutated in place on update.
    Text(Rc<RefCell<String>>),
}

/// What the commit phase must do for a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum EffectTag {
    #[default]
    None,
    /// Newly created; needs its backing object.
    Placement,
    /// Reused; props may have changed.
    Update,
}

pub(crate) struct Fiber {
    pub kind: FiberKind,
    pub props: Props,
    pub key: Option<String>,
    pub dom: Option<DomHandle>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    /// The committed fiber this one was derived from, if any.
    pub alternate: Option<FiberId>,
    pub effect_tag: EffectTag,
    /// Hook slot storage, shared between a fiber and its alternate.
    pub hooks: Rc<RefCell<Vec<HookSlot>>>,
    /// Provider fibers: the value visible to the subtree.
    pub provider_value: Option<Rc<dyn Any>>,
    /// Raw fibers: the current text content.
    pub raw: Option<String>,
    /// Set when the style differs from the alternate and the layout node
    /// needs restyling on commit.
    pub style_dirty: bool,
    /// Whether this fiber's component has rendered before.
    pub mounted: bool,
}

impl Fiber {
    pub fn new(kind: FiberKind, props: Props, key: Option<String>) -> Self {
        Self {
            kind,
            props,
            key,
            dom: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect_tag: EffectTag::None,
            hooks: Rc::default(),
            provider_value: None,
            raw: None,
            style_dirty: false,
            mounted: false,
        }
    }

    pub fn root() -> Self {
        Self::new(FiberKind::Root, Props::default(), None)
    }
}

/// Concatenate the raw-text descendants of a text host, in tree order.
pub(crate) fn squash_text(
    fibers: &slotmap::SlotMap<FiberId, Fiber>,
    id: FiberId,
) -> String {
    fn collect(fibers: &slotmap::SlotMap<FiberId, Fiber>, id: FiberId, out: &mut String) {
        for child in child_ids(fibers, id) {
            let fiber = &fibers[child];
            if let FiberKind::Raw = fiber.kind {
                match (&fiber.dom, &fiber.raw) {
                    (Some(DomHandle::Text(holder)), _) => out.push_str(&holder.borrow()),
                    (_, Some(raw)) => out.push_str(raw),
                    _ => {}
                }
            } else {
                collect(fibers, child, out);
            }
        }
    }
    let mut out = String::new();
    collect(fibers, id, &mut out);
    out
}

/// Collect the children of `fiber` in sibling order.
pub(crate) fn child_ids(
    fibers: &slotmap::SlotMap<FiberId, Fiber>,
    fiber: FiberId,
) -> Vec<FiberId> {
    let mut out = Vec::new();
    let mut next = fibers.get(fiber).and_then(|f| f.child);
    while let Some(id) = next {
        out.push(id);
        next = fibers.get(id).and_then(|f| f.sibling);
    }
    out
}
