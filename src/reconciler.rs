//! The fiber reconciler and render scheduler.
//!
//! [`Renderer`] drives the render cycle: the current element tree is
//! expanded into a work-in-progress fiber tree (rendering components and
//! reconciling children against the committed tree), then committed in one
//! pass that creates, restyles, and frees layout nodes, then laid out,
//! painted into a frame string, and finally the scheduled effects run.
//!
//! A failed cycle discards the work-in-progress tree; the committed tree
//! and its frame stay in place.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;

use crate::element::{Element, ElementKind, HostTag};
use crate::error::RenderError;
use crate::fiber::{
    child_ids, squash_text, DomHandle, EffectTag, Fiber, FiberId, FiberKind,
};
use crate::hooks::{self, CleanupFn, EffectFn, HookSlot};
use crate::layout::LayoutAdapter;
use crate::render::output::Output;
use crate::render::painter;

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

struct SchedulerState {
    dirty: Cell<bool>,
    batch_depth: Cell<usize>,
    core: RefCell<Weak<RefCell<Core>>>,
}

/// Requests render cycles on behalf of state setters.
///
/// A request made while a cycle is in progress (from an effect, for
/// example) is deferred and served when the current cycle finishes.
pub(crate) struct Scheduler {
    state: Rc<SchedulerState>,
}

impl Clone for Scheduler {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(SchedulerState {
                dirty: Cell::new(false),
                batch_depth: Cell::new(0),
                core: RefCell::new(Weak::new()),
            }),
        }
    }

    fn attach(&self, core: &Rc<RefCell<Core>>) {
        *self.state.core.borrow_mut() = Rc::downgrade(core);
    }

    pub(crate) fn request_render(&self) {
        self.state.dirty.set(true);
        if self.state.batch_depth.get() == 0 {
            self.flush();
        }
    }

    fn begin_batch(&self) {
        self.state.batch_depth.set(self.state.batch_depth.get() + 1);
    }

    fn end_batch(&self) {
        let depth = self.state.batch_depth.get().saturating_sub(1);
        self.state.batch_depth.set(depth);
        if depth == 0 {
            self.flush();
        }
    }

    /// Run render cycles until the dirty flag stays clear.
    fn flush(&self) {
        let Some(core) = self.state.core.borrow().upgrade() else {
            self.state.dirty.set(false);
            return;
        };
        while self.state.dirty.get() {
            self.state.dirty.set(false);
            let Ok(mut core) = core.try_borrow_mut() else {
                // A cycle is in progress; it flushes again when done.
                self.state.dirty.set(true);
                return;
            };
            if let Err(err) = core.render_cycle() {
                core.last_error = Some(err);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

struct Core {
    fibers: SlotMap<FiberId, Fiber>,
    layout: LayoutAdapter,
    /// Persistent column container sized to the terminal width.
    layout_root: taffy::NodeId,
    committed: Option<FiberId>,
    root_element: Option<Element>,
    width: u16,
    on_commit: Option<Box<dyn FnMut(&str, usize)>>,
    last_frame: String,
    last_height: usize,
    /// Error from a setter-triggered cycle, surfaced on the next API call.
    last_error: Option<RenderError>,
    /// Non-fatal style resolution errors from the last cycles.
    style_errors: Vec<RenderError>,
    scheduler: Scheduler,
}

impl Core {
    fn render_cycle(&mut self) -> Result<(), RenderError> {
        let Some(root_el) = self.root_element.clone() else {
            return Ok(());
        };

        let wip = self.fibers.insert(Fiber::root());
        self.fibers[wip].alternate = self.committed;
        self.fibers[wip].dom = Some(DomHandle::Node(self.layout_root));
        self.fibers[wip].props.children = vec![root_el];

        let mut deletions = Vec::new();
        if let Err(err) = self.work_fiber(wip, &mut deletions) {
            self.discard_tree(wip);
            return Err(err);
        }

        self.commit(wip, deletions);
        self.compute_and_paint();
        self.run_effects(wip);
        Ok(())
    }

    // --- render phase ---

    /// Expand one fiber, catching subtree errors at declared boundaries.
    fn work_fiber(&mut self, id: FiberId, deletions: &mut Vec<FiberId>) -> Result<(), RenderError> {
        let fallback = self.fibers[id].props.fallback.clone();
        let mark = deletions.len();
        match self.work_fiber_inner(id, deletions) {
            Ok(()) => Ok(()),
            Err(err) => {
                let Some(fallback) = fallback else {
                    return Err(err);
                };
                deletions.truncate(mark);
                self.discard_children(id);
                let replacement = fallback(&err);
                self.reconcile_children(id, vec![replacement], deletions);
                for child in child_ids(&self.fibers, id) {
                    self.work_fiber(child, deletions)?;
                }
                Ok(())
            }
        }
    }

    fn work_fiber_inner(
        &mut self,
        id: FiberId,
        deletions: &mut Vec<FiberId>,
    ) -> Result<(), RenderError> {
        let kind = self.fibers[id].kind.clone();
        let next_children: Vec<Element> = match kind {
            FiberKind::Component { render, name } => {
                let props = self.fibers[id].props.clone();
                let hooks = self.fibers[id].hooks.clone();
                let mounted = self.fibers[id].mounted;
                let providers = self.collect_providers(id);
                hooks::activate(
                    hooks,
                    mounted,
                    name.to_string(),
                    self.scheduler.clone(),
                    providers,
                );
                let rendered = render(&props);
                let finish = hooks::deactivate();
                let element = rendered?;
                finish?;
                self.fibers[id].mounted = true;
                vec![element]
            }
            FiberKind::Raw => Vec::new(),
            _ => self.fibers[id].props.children.clone(),
        };
        self.reconcile_children(id, next_children, deletions);
        for child in child_ids(&self.fibers, id) {
            self.work_fiber(child, deletions)?;
        }
        Ok(())
    }

    /// Provider values on the path from `id` to the root, innermost first.
    fn collect_providers(&self, id: FiberId) -> Vec<(u64, Rc<dyn Any>)> {
        let mut out = Vec::new();
        let mut next = self.fibers.get(id).and_then(|f| f.parent);
        while let Some(pid) = next {
            let fiber = &self.fibers[pid];
            if let FiberKind::Provider { ctx_id } = fiber.kind {
                if let Some(value) = &fiber.provider_value {
                    out.push((ctx_id, value.clone()));
                }
            }
            next = fiber.parent;
        }
        out
    }

    /// Match the new child elements against the alternate's children.
    ///
    /// Keyed elements match an unused old child with the same key and type;
    /// unkeyed elements match the nth unkeyed old child, replacing it when
    /// the type differs. Old children left unmatched become deletions.
    fn reconcile_children(
        &mut self,
        parent: FiberId,
        elements: Vec<Element>,
        deletions: &mut Vec<FiberId>,
    ) {
        let old_children: Vec<FiberId> = self.fibers[parent]
            .alternate
            .map(|alt| child_ids(&self.fibers, alt))
            .unwrap_or_default();

        let mut used = vec![false; old_children.len()];
        let mut keyed: HashMap<&str, usize> = HashMap::new();
        let mut unkeyed: Vec<usize> = Vec::new();
        for (i, &oid) in old_children.iter().enumerate() {
            match &self.fibers[oid].key {
                Some(k) => {
                    keyed.entry(k.as_str()).or_insert(i);
                }
                None => unkeyed.push(i),
            }
        }
        let keyed: HashMap<String, usize> = keyed
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let mut next_unkeyed = 0usize;
        let mut prev: Option<FiberId> = None;
        for element in elements {
            let el_kind = kind_of(&element);
            let matched = match &element.key {
                Some(k) => keyed.get(k).copied().filter(|&i| {
                    !used[i] && self.fibers[old_children[i]].kind.same_type(&el_kind)
                }),
                None => {
                    let pos = unkeyed.get(next_unkeyed).copied();
                    next_unkeyed += 1;
                    pos
                }
            };

            let new_id = match matched {
                Some(i) if self.fibers[old_children[i]].kind.same_type(&el_kind) => {
                    used[i] = true;
                    self.reuse_fiber(old_children[i], element)
                }
                Some(i) => {
                    // Positional match of a different type replaces the node.
                    used[i] = true;
                    deletions.push(old_children[i]);
                    self.create_fiber(element)
                }
                None => self.create_fiber(element),
            };

            self.fibers[new_id].parent = Some(parent);
            match prev {
                None => self.fibers[parent].child = Some(new_id),
                Some(p) => self.fibers[p].sibling = Some(new_id),
            }
            prev = Some(new_id);
        }

        for (i, &oid) in old_children.iter().enumerate() {
            if !used[i] {
                deletions.push(oid);
            }
        }
    }

    fn create_fiber(&mut self, element: Element) -> FiberId {
        let kind = kind_of(&element);
        let Element { kind: el_kind, props, key } = element;
        let mut fiber = Fiber::new(kind, props, key);
        fiber.effect_tag = EffectTag::Placement;
        match el_kind {
            ElementKind::Provider { value, .. } => fiber.provider_value = Some(value),
            ElementKind::Raw(content) => fiber.raw = Some(content),
            _ => {}
        }
        self.fibers.insert(fiber)
    }

    fn reuse_fiber(&mut self, old_id: FiberId, element: Element) -> FiberId {
        let kind = kind_of(&element);
        let (dom, hooks, mounted, style_dirty) = {
            let old = &self.fibers[old_id];
            (
                old.dom.clone(),
                old.hooks.clone(),
                old.mounted,
                old.props.style != element.props.style,
            )
        };
        let Element { kind: el_kind, props, key } = element;
        let mut fiber = Fiber::new(kind, props, key);
        fiber.dom = dom;
        fiber.hooks = hooks;
        fiber.mounted = mounted;
        fiber.alternate = Some(old_id);
        fiber.effect_tag = EffectTag::Update;
        fiber.style_dirty = style_dirty;
        match el_kind {
            ElementKind::Provider { value, .. } => fiber.provider_value = Some(value),
            ElementKind::Raw(content) => fiber.raw = Some(content),
            _ => {}
        }
        self.fibers.insert(fiber)
    }

    /// Drop `parent`'s work-in-progress children from the arena without
    /// touching backing objects (they still belong to the committed tree).
    fn discard_children(&mut self, parent: FiberId) {
        let mut stack: Vec<FiberId> = self.fibers[parent].child.take().into_iter().collect();
        while let Some(id) = stack.pop() {
            if let Some(fiber) = self.fibers.remove(id) {
                if let Some(c) = fiber.child {
                    stack.push(c);
                }
                if let Some(s) = fiber.sibling {
                    stack.push(s);
                }
            }
        }
    }

    fn discard_tree(&mut self, root: FiberId) {
        self.discard_children(root);
        self.fibers.remove(root);
    }

    // --- commit phase ---

    fn commit(&mut self, wip: FiberId, deletions: Vec<FiberId>) {
        for id in deletions {
            self.commit_deletion(id);
        }
        self.commit_work(wip);
        self.sync_layout(wip);
        let old = self.committed.replace(wip);
        if let Some(old) = old {
            self.release_tree(old);
        }
    }

    /// Unmount a committed subtree: run effect cleanups top-down, free
    /// layout nodes, and drop the fibers.
    fn commit_deletion(&mut self, id: FiberId) {
        let Some(fiber) = self.fibers.remove(id) else {
            return;
        };
        let mut cleanups: Vec<CleanupFn> = Vec::new();
        {
            let mut slots = fiber.hooks.borrow_mut();
            for slot in slots.iter_mut() {
                if let HookSlot::Effect {
                    callback,
                    cleanup,
                    scheduled,
                    ..
                } = slot
                {
                    *callback = None;
                    *scheduled = false;
                    if let Some(c) = cleanup.take() {
                        cleanups.push(c);
                    }
                }
            }
        }
        for cleanup in cleanups {
            cleanup();
        }
        if let Some(DomHandle::Node(node)) = fiber.dom {
            self.layout.free(node);
        }
        let mut next = fiber.child;
        while let Some(child) = next {
            next = self.fibers.get(child).and_then(|f| f.sibling);
            self.commit_deletion(child);
        }
    }

    fn commit_work(&mut self, wip: FiberId) {
        for id in self.collect_tree(wip) {
            match self.fibers[id].effect_tag {
                EffectTag::Placement => {
                    let kind = self.fibers[id].kind.clone();
                    match kind {
                        FiberKind::Host(tag) => {
                            let style = self.fibers[id].props.style.clone();
                            let node = match tag {
                                HostTag::Box => self.layout.new_node(&style),
                                HostTag::Text => self.layout.new_text_node(&style),
                            };
                            self.fibers[id].dom = Some(DomHandle::Node(node));
                        }
                        FiberKind::Raw => {
                            let content = self.fibers[id].raw.clone().unwrap_or_default();
                            self.fibers[id].dom =
                                Some(DomHandle::Text(Rc::new(RefCell::new(content))));
                        }
                        _ => {}
                    }
                }
                EffectTag::Update => {
                    if self.fibers[id].style_dirty {
                        if let Some(DomHandle::Node(node)) = self.fibers[id].dom {
                            let style = self.fibers[id].props.style.clone();
                            if matches!(self.fibers[id].kind, FiberKind::Host(HostTag::Text)) {
                                self.layout.set_text_style(node, &style);
                            } else {
                                self.layout.set_style(node, &style);
                            }
                        }
                    }
                    if let (Some(raw), Some(DomHandle::Text(holder))) =
                        (&self.fibers[id].raw, &self.fibers[id].dom)
                    {
                        if *holder.borrow() != *raw {
                            *holder.borrow_mut() = raw.clone();
                        }
                    }
                }
                EffectTag::None => {}
            }
        }
    }

    /// Mirror the fiber tree's host structure into the layout tree.
    fn sync_layout(&mut self, wip: FiberId) {
        for id in self.collect_tree(wip) {
            let kind = self.fibers[id].kind.clone();
            match kind {
                FiberKind::Root => {
                    let children = self.collect_host_children(id);
                    self.layout.set_children(self.layout_root, &children);
                }
                FiberKind::Host(HostTag::Box) => {
                    if let Some(DomHandle::Node(node)) = self.fibers[id].dom {
                        let children = self.collect_host_children(id);
                        self.layout.set_children(node, &children);
                    }
                }
                FiberKind::Host(HostTag::Text) => {
                    if let Some(DomHandle::Node(node)) = self.fibers[id].dom {
                        let content = squash_text(&self.fibers, id);
                        let wrap = self.fibers[id].props.style.wrap;
                        self.layout.set_text(node, content, wrap);
                    }
                }
                _ => {}
            }
        }
    }

    /// The nearest host descendants of `id`, descending through components,
    /// providers, and raws, stopping at host nodes.
    fn collect_host_children(&self, id: FiberId) -> Vec<taffy::NodeId> {
        let mut out = Vec::new();
        for child in child_ids(&self.fibers, id) {
            let fiber = &self.fibers[child];
            if let FiberKind::Host(_) = fiber.kind {
                if let Some(DomHandle::Node(node)) = fiber.dom {
                    out.push(node);
                }
            } else {
                out.extend(self.collect_host_children(child));
            }
        }
        out
    }

    /// Drop the replaced committed tree's fibers. Backing objects are
    /// shared with the new tree (or were freed as deletions) and stay.
    fn release_tree(&mut self, root: FiberId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(fiber) = self.fibers.remove(id) {
                if let Some(c) = fiber.child {
                    stack.push(c);
                }
                if let Some(s) = fiber.sibling {
                    stack.push(s);
                }
            }
        }
    }

    fn collect_tree(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.fibers.contains_key(id) {
                continue;
            }
            out.push(id);
            let fiber = &self.fibers[id];
            if id != root {
                if let Some(s) = fiber.sibling {
                    stack.push(s);
                }
            }
            if let Some(c) = fiber.child {
                stack.push(c);
            }
        }
        out
    }

    // --- output phase ---

    fn compute_and_paint(&mut self) {
        self.layout.compute(self.layout_root, self.width);
        self.style_errors.extend(self.layout.take_errors());

        let region = self.layout.layout_of(self.layout_root);
        let height = region.height.max(0) as usize;
        let mut out = Output::new(self.width as usize, height);
        if let Some(root) = self.committed {
            painter::paint(&self.fibers, &self.layout, root, &mut out);
        }
        let (frame, lines) = out.extract();
        self.last_frame = frame;
        self.last_height = lines;

        if let Some(mut callback) = self.on_commit.take() {
            callback(&self.last_frame, self.last_height);
            self.on_commit = Some(callback);
        }
    }

    /// Run scheduled effects top-down, each preceded by its prior cleanup.
    fn run_effects(&mut self, root: FiberId) {
        for id in self.collect_tree(root) {
            let Some(hooks) = self.fibers.get(id).map(|f| f.hooks.clone()) else {
                continue;
            };
            let len = hooks.borrow().len();
            for slot_idx in 0..len {
                let work: Option<(Option<CleanupFn>, EffectFn)> = {
                    let mut slots = hooks.borrow_mut();
                    match &mut slots[slot_idx] {
                        HookSlot::Effect {
                            scheduled,
                            callback,
                            cleanup,
                            ..
                        } if *scheduled => {
                            *scheduled = false;
                            callback.take().map(|cb| (cleanup.take(), cb))
                        }
                        _ => None,
                    }
                };
                if let Some((cleanup, callback)) = work {
                    if let Some(cleanup) = cleanup {
                        cleanup();
                    }
                    let next_cleanup = callback();
                    let mut slots = hooks.borrow_mut();
                    if let HookSlot::Effect { cleanup, .. } = &mut slots[slot_idx] {
                        *cleanup = next_cleanup;
                    }
                }
            }
        }
    }
}

fn kind_of(element: &Element) -> FiberKind {
    match &element.kind {
        ElementKind::Host(tag) => FiberKind::Host(*tag),
        ElementKind::Component { render, name } => FiberKind::Component {
            render: *render,
            name,
        },
        ElementKind::Provider { ctx_id, .. } => FiberKind::Provider { ctx_id: *ctx_id },
        ElementKind::Raw(_) => FiberKind::Raw,
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders element trees to frame strings and re-renders on state changes.
pub struct Renderer {
    core: Rc<RefCell<Core>>,
    scheduler: Scheduler,
}

impl Renderer {
    /// Create a renderer for a terminal `width` columns wide. Frames grow
    /// downward as tall as their content.
    pub fn new(width: u16) -> Self {
        let scheduler = Scheduler::new();
        let mut layout = LayoutAdapter::new();
        let layout_root = layout.new_root(width);
        let core = Rc::new(RefCell::new(Core {
            fibers: SlotMap::with_key(),
            layout,
            layout_root,
            committed: None,
            root_element: None,
            width,
            on_commit: None,
            last_frame: String::new(),
            last_height: 0,
            last_error: None,
            style_errors: Vec::new(),
            scheduler: scheduler.clone(),
        }));
        scheduler.attach(&core);
        Self { core, scheduler }
    }

    /// Render `element` as the root of the tree.
    ///
    /// Also surfaces any error stored by an earlier setter-triggered cycle.
    pub fn render(&mut self, element: Element) -> Result<(), RenderError> {
        {
            let mut core = self.core.borrow_mut();
            core.root_element = Some(element);
            core.render_cycle()?;
        }
        self.scheduler.flush();
        match self.core.borrow_mut().last_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Coalesce the state updates made inside `f` into one render cycle.
    pub fn batch(&mut self, f: impl FnOnce()) {
        self.scheduler.begin_batch();
        f();
        self.scheduler.end_batch();
    }

    /// Register the frame sink called after every commit with
    /// `(frame, line_count)`.
    pub fn on_commit(&mut self, f: impl FnMut(&str, usize) + 'static) {
        self.core.borrow_mut().on_commit = Some(Box::new(f));
    }

    /// The last committed frame.
    pub fn frame(&self) -> String {
        self.core.borrow().last_frame.clone()
    }

    /// Line count of the last committed frame.
    pub fn line_count(&self) -> usize {
        self.core.borrow().last_height
    }

    pub fn width(&self) -> u16 {
        self.core.borrow().width
    }

    /// Change the terminal width and re-render.
    pub fn resize(&mut self, width: u16) {
        {
            let mut core = self.core.borrow_mut();
            core.width = width;
            let root = core.layout_root;
            core.layout.set_root_width(root, width);
        }
        self.scheduler.request_render();
    }

    /// Error stored by a setter-triggered cycle, if any.
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.core.borrow_mut().last_error.take()
    }

    /// Non-fatal style resolution errors accumulated since the last call.
    pub fn take_style_errors(&mut self) -> Vec<RenderError> {
        std::mem::take(&mut self.core.borrow_mut().style_errors)
    }

    /// Tear down the tree: run all effect cleanups and free layout nodes.
    /// A later render mounts from scratch.
    pub fn unmount(&mut self) {
        let mut core = self.core.borrow_mut();
        core.root_element = None;
        if let Some(root) = core.committed.take() {
            // The root fiber borrows the persistent layout root, which must
            // survive for later mounts.
            if let Some(fiber) = core.fibers.get_mut(root) {
                fiber.dom = None;
            }
            core.commit_deletion(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Props;
    use crate::hooks::{use_context, use_effect, use_state, Dep, StateSetter};
    use crate::style::{BorderKind, Style};
    use crate::text::strip_ansi;
    use pretty_assertions::assert_eq;

    fn plain(renderer: &Renderer) -> String {
        strip_ansi(&renderer.frame())
    }

    // --- static trees ---

    #[test]
    fn renders_text() {
        let mut r = Renderer::new(20);
        r.render(Element::text().with_text("hello")).unwrap();
        assert_eq!(plain(&r), "hello");
        assert_eq!(r.line_count(), 1);
    }

    #[test]
    fn renders_nested_boxes_with_border() {
        let mut r = Renderer::new(20);
        let tree = Element::container()
            .with_style(Style::new().with_width(7.0).with_border(BorderKind::Single))
            .with_child(Element::text().with_text("hi"));
        r.render(tree).unwrap();
        assert_eq!(plain(&r), "┌─────┐\n│hi   │\n└─────┘");
    }

    #[test]
    fn text_in_a_row_box_wraps_instead_of_overflowing() {
        let mut r = Renderer::new(10);
        let tree = Element::container()
            .with_child(Element::text().with_text("aaaa bbbb cccc"));
        r.render(tree).unwrap();
        assert_eq!(plain(&r), "aaaa bbbb\ncccc");
        assert_eq!(r.line_count(), 2);
    }

    #[test]
    fn rerender_replaces_content() {
        let mut r = Renderer::new(20);
        r.render(Element::text().with_text("one")).unwrap();
        r.render(Element::text().with_text("two")).unwrap();
        assert_eq!(plain(&r), "two");
    }

    // --- state ---

    thread_local! {
        static COUNTER_SETTER: RefCell<Option<StateSetter<i64>>> =
            const { RefCell::new(None) };
    }

    fn counter(_: &Props) -> Result<Element, RenderError> {
        let (n, set) = use_state(|| 0i64)?;
        COUNTER_SETTER.with(|c| *c.borrow_mut() = Some(set));
        Ok(Element::text().with_text(n.to_string()))
    }

    #[test]
    fn setter_triggers_rerender() {
        let mut r = Renderer::new(10);
        r.render(Element::component("Counter", counter)).unwrap();
        assert_eq!(plain(&r), "0");

        let set = COUNTER_SETTER.with(|c| c.borrow().clone().unwrap());
        set.set(5);
        assert_eq!(plain(&r), "5");
        set.update(|n| n + 2);
        assert_eq!(plain(&r), "7");
    }

    #[test]
    fn batch_coalesces_commits() {
        let mut r = Renderer::new(10);
        let commits = Rc::new(Cell::new(0usize));
        let seen = commits.clone();
        r.on_commit(move |_, _| seen.set(seen.get() + 1));
        r.render(Element::component("Counter", counter)).unwrap();
        let before = commits.get();

        let set = COUNTER_SETTER.with(|c| c.borrow().clone().unwrap());
        r.batch(|| {
            set.set(0);
            set.update(|n| n + 1);
            set.update(|n| n + 1);
            set.update(|n| n + 1);
        });
        assert_eq!(commits.get(), before + 1);
        assert_eq!(plain(&r), "3");
    }

    // --- keys ---

    thread_local! {
        static ITEM_SETTERS: RefCell<HashMap<String, StateSetter<String>>> =
            RefCell::new(HashMap::new());
    }

    fn keyed_item(props: &Props) -> Result<Element, RenderError> {
        let label = props.get_str("label").unwrap_or_default().to_string();
        let initial = label.clone();
        let (value, set) = use_state(move || initial)?;
        ITEM_SETTERS.with(|s| s.borrow_mut().insert(label, set));
        Ok(Element::text().with_text(value))
    }

    fn item_list(order: &[&str]) -> Element {
        Element::container().with_children(order.iter().map(|k| {
            Element::component("KeyedItem", keyed_item)
                .with_key(*k)
                .with_prop("label", *k)
        }))
    }

    #[test]
    fn keyed_reorder_preserves_state() {
        let mut r = Renderer::new(20);
        r.render(item_list(&["a", "b"])).unwrap();
        let set = ITEM_SETTERS.with(|s| s.borrow()["a"].clone());
        set.set("A!".to_string());
        assert_eq!(plain(&r), "A!b");

        r.render(item_list(&["b", "a"])).unwrap();
        assert_eq!(plain(&r), "bA!");
    }

    #[test]
    fn unkeyed_type_change_resets_state() {
        let mut r = Renderer::new(20);
        r.render(Element::container().with_child(Element::component("Counter", counter)))
            .unwrap();
        let set = COUNTER_SETTER.with(|c| c.borrow().clone().unwrap());
        set.set(9);
        assert_eq!(plain(&r), "9");

        // Same position, different type, then back: state is gone.
        r.render(Element::container().with_child(Element::text().with_text("x")))
            .unwrap();
        r.render(Element::container().with_child(Element::component("Counter", counter)))
            .unwrap();
        assert_eq!(plain(&r), "0");
    }

    // --- deletions ---

    #[test]
    fn removed_children_free_their_layout_nodes() {
        let mut r = Renderer::new(20);
        let many = Element::container()
            .with_children((0..5).map(|i| Element::text().with_text(i.to_string())));
        r.render(many).unwrap();
        let (total_before, released_before) = {
            let core = r.core.borrow();
            (core.layout.total_node_count(), core.layout.released_count())
        };

        r.render(Element::container()).unwrap();
        let core = r.core.borrow();
        assert_eq!(core.layout.released_count(), released_before + 5);
        assert_eq!(core.layout.total_node_count(), total_before - 5);
    }

    #[test]
    fn unkeyed_same_type_rerender_reuses_layout_nodes() {
        let mut r = Renderer::new(20);
        let tree = |label: &str| {
            Element::container()
                .with_child(Element::text().with_text(label.to_string()))
        };
        r.render(tree("a")).unwrap();
        let (total, released) = {
            let core = r.core.borrow();
            (core.layout.total_node_count(), core.layout.released_count())
        };

        r.render(tree("b")).unwrap();
        let core = r.core.borrow();
        assert_eq!(core.layout.total_node_count(), total);
        assert_eq!(core.layout.released_count(), released);
        drop(core);
        assert_eq!(plain(&r), "b");
    }

    // --- context ---

    thread_local! {
        static THEME: crate::context::Context<String> =
            crate::context::Context::new("plain".to_string());
    }

    fn themed(_: &Props) -> Result<Element, RenderError> {
        let theme = THEME.with(use_context)?;
        Ok(Element::text().with_text(theme))
    }

    #[test]
    fn provider_supplies_context_value() {
        let mut r = Renderer::new(20);
        let tree = THEME
            .with(|c| Element::provider(c, "dark".to_string()))
            .with_child(Element::component("Themed", themed));
        r.render(tree).unwrap();
        assert_eq!(plain(&r), "dark");

        r.render(Element::component("Themed", themed)).unwrap();
        assert_eq!(plain(&r), "plain");
    }

    // --- effects ---

    thread_local! {
        static EFFECT_LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn log(entry: impl Into<String>) {
        EFFECT_LOG.with(|l| l.borrow_mut().push(entry.into()));
    }

    fn take_log() -> Vec<String> {
        EFFECT_LOG.with(|l| std::mem::take(&mut *l.borrow_mut()))
    }

    fn effectful(props: &Props) -> Result<Element, RenderError> {
        let tag = props.get_int("tag").unwrap_or(0);
        use_effect(
            move || {
                log(format!("run {tag}"));
                Some(Box::new(move || log(format!("cleanup {tag}"))) as CleanupFn)
            },
            Some(vec![Dep::Int(tag)]),
        )?;
        Ok(Element::text().with_text("x"))
    }

    #[test]
    fn effects_run_after_commit_and_clean_up() {
        let mut r = Renderer::new(10);
        let tree = |tag: i64| Element::component("Effectful", effectful).with_prop("tag", tag);

        take_log();
        r.render(tree(1)).unwrap();
        assert_eq!(take_log(), vec!["run 1"]);

        // Unchanged deps: no re-run.
        r.render(tree(1)).unwrap();
        assert_eq!(take_log(), Vec::<String>::new());

        // Changed deps: cleanup first, then re-run.
        r.render(tree(2)).unwrap();
        assert_eq!(take_log(), vec!["cleanup 1", "run 2"]);

        // Unmount: cleanup only.
        r.render(Element::text().with_text("done")).unwrap();
        assert_eq!(take_log(), vec!["cleanup 2"]);
    }

    #[test]
    fn unmount_runs_cleanups() {
        let mut r = Renderer::new(10);
        take_log();
        r.render(Element::component("Effectful", effectful).with_prop("tag", 7))
            .unwrap();
        assert_eq!(take_log(), vec!["run 7"]);
        r.unmount();
        assert_eq!(take_log(), vec!["cleanup 7"]);
    }

    #[test]
    fn render_after_unmount_mounts_fresh() {
        let mut r = Renderer::new(10);
        r.render(Element::text().with_text("one")).unwrap();
        r.unmount();

        r.render(Element::text().with_text("two")).unwrap();
        assert_eq!(plain(&r), "two");
    }

    // --- errors ---

    fn failing(_: &Props) -> Result<Element, RenderError> {
        Err(RenderError::component("Failing", "boom"))
    }

    #[test]
    fn fallback_catches_descendant_errors() {
        let mut r = Renderer::new(40);
        let tree = Element::container()
            .with_fallback(|err| Element::text().with_text(err.to_string()))
            .with_child(Element::component("Failing", failing));
        r.render(tree).unwrap();
        assert!(plain(&r).contains("boom"));
    }

    #[test]
    fn uncaught_error_keeps_previous_frame() {
        let mut r = Renderer::new(20);
        r.render(Element::text().with_text("ok")).unwrap();
        let err = r
            .render(Element::component("Failing", failing))
            .unwrap_err();
        assert!(matches!(err, RenderError::ComponentRenderError { .. }));
        assert_eq!(plain(&r), "ok");
    }

    thread_local! {
        static SKIP_FIRST_HOOK: Cell<bool> = const { Cell::new(false) };
    }

    fn flipper(_: &Props) -> Result<Element, RenderError> {
        if !SKIP_FIRST_HOOK.with(|f| f.get()) {
            use_state(|| 0i64)?;
        }
        use_state(|| 1i64)?;
        Ok(Element::text().with_text("x"))
    }

    #[test]
    fn hook_order_change_is_an_error() {
        let mut r = Renderer::new(10);
        SKIP_FIRST_HOOK.with(|f| f.set(false));
        r.render(Element::component("Flipper", flipper)).unwrap();

        SKIP_FIRST_HOOK.with(|f| f.set(true));
        let err = r
            .render(Element::component("Flipper", flipper))
            .unwrap_err();
        assert!(matches!(err, RenderError::HookOrderViolation { .. }));
    }

    #[test]
    fn invalid_style_is_reported_but_renders() {
        let mut r = Renderer::new(20);
        let style = Style {
            width: crate::style::Dimension::Cells(-4.0),
            ..Style::default()
        };
        r.render(Element::container().with_style(style).with_child(
            Element::text().with_text("still here"),
        ))
        .unwrap();
        assert!(plain(&r).contains("still here"));
        assert!(!r.take_style_errors().is_empty());
    }

    #[test]
    fn resize_rerenders_at_new_width() {
        let mut r = Renderer::new(12);
        r.render(Element::text().with_text("aaa bbb ccc")).unwrap();
        assert_eq!(r.line_count(), 1);

        r.resize(5);
        assert_eq!(plain(&r), "aaa\nbbb\nccc");
    }
}
