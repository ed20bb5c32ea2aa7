//! The hook runtime for function components.
//!
//! Hooks read and write per-fiber slot storage through a thread-local
//! "active fiber" that the reconciler installs around each component call.
//! The contract is positional: a component must call the same hooks in the
//! same order on every render. Violations surface as
//! [`RenderError::HookOrderViolation`]; calling a hook with no active fiber
//! surfaces as [`RenderError::HooksOutsideRender`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::error::RenderError;
use crate::reconciler::Scheduler;

/// An effect cleanup, run before the effect re-runs and on unmount.
pub type CleanupFn = Box<dyn FnOnce()>;
/// An effect body; may hand back a cleanup.
pub type EffectFn = Box<dyn FnOnce() -> Option<CleanupFn>>;

// ---------------------------------------------------------------------------
// Dependency values
// ---------------------------------------------------------------------------

/// A comparable dependency value for `use_effect` / `use_memo`.
#[derive(Debug, Clone, PartialEq)]
pub enum Dep {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    Unit,
}

impl From<i64> for Dep {
    fn from(v: i64) -> Self {
        Dep::Int(v)
    }
}

impl From<i32> for Dep {
    fn from(v: i32) -> Self {
        Dep::Int(v as i64)
    }
}

impl From<usize> for Dep {
    fn from(v: usize) -> Self {
        Dep::Uint(v as u64)
    }
}

impl From<u64> for Dep {
    fn from(v: u64) -> Self {
        Dep::Uint(v)
    }
}

impl From<f64> for Dep {
    fn from(v: f64) -> Self {
        Dep::Float(v)
    }
}

impl From<bool> for Dep {
    fn from(v: bool) -> Self {
        Dep::Bool(v)
    }
}

impl From<&str> for Dep {
    fn from(v: &str) -> Self {
        Dep::Str(v.to_string())
    }
}

impl From<String> for Dep {
    fn from(v: String) -> Self {
        Dep::Str(v)
    }
}

impl From<()> for Dep {
    fn from(_: ()) -> Self {
        Dep::Unit
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// One positional hook slot on a fiber.
pub(crate) enum HookSlot {
    State {
        /// `Rc<RefCell<T>>` behind a type-erased handle.
        value: Rc<dyn Any>,
        /// `Rc<RefCell<Vec<StateUpdate<T>>>>` drained on the next render.
        queue: Rc<dyn Any>,
    },
    Effect {
        callback: Option<EffectFn>,
        cleanup: Option<CleanupFn>,
        deps: Option<Vec<Dep>>,
        /// Set when the commit phase should (re-)run this effect.
        scheduled: bool,
    },
    Memo {
        /// `Rc<T>` behind a type-erased handle.
        value: Rc<dyn Any>,
        deps: Vec<Dep>,
    },
}

pub(crate) enum StateUpdate<T> {
    Set(T),
    Apply(Box<dyn FnOnce(&T) -> T>),
}

// ---------------------------------------------------------------------------
// The active fiber
// ---------------------------------------------------------------------------

struct ActiveFiber {
    slots: Rc<RefCell<Vec<HookSlot>>>,
    cursor: Cell<usize>,
    /// Whether this fiber has rendered before. New slots may only be
    /// created on the first render.
    mounted: bool,
    component: String,
    scheduler: Scheduler,
    /// Provider values on the path to the root, innermost first.
    providers: Vec<(u64, Rc<dyn Any>)>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveFiber>> = const { RefCell::new(None) };
}

/// Install the hook storage for the component about to render.
pub(crate) fn activate(
    slots: Rc<RefCell<Vec<HookSlot>>>,
    mounted: bool,
    component: String,
    scheduler: Scheduler,
    providers: Vec<(u64, Rc<dyn Any>)>,
) {
    ACTIVE.with(|cell| {
        *cell.borrow_mut() = Some(ActiveFiber {
            slots,
            cursor: Cell::new(0),
            mounted,
            component,
            scheduler,
            providers,
        });
    });
}

/// Tear down the active fiber after the component returned.
///
/// A mounted component that consumed fewer slots than it owns skipped a
/// hook call, which breaks the positional contract.
pub(crate) fn deactivate() -> Result<(), RenderError> {
    ACTIVE.with(|cell| {
        let Some(fiber) = cell.borrow_mut().take() else {
            return Ok(());
        };
        let used = fiber.cursor.get();
        if fiber.mounted && used != fiber.slots.borrow().len() {
            return Err(RenderError::HookOrderViolation {
                component: fiber.component,
                index: used,
            });
        }
        Ok(())
    })
}

fn with_active<R>(f: impl FnOnce(&ActiveFiber) -> Result<R, RenderError>) -> Result<R, RenderError> {
    ACTIVE.with(|cell| match cell.borrow().as_ref() {
        Some(fiber) => f(fiber),
        None => Err(RenderError::HooksOutsideRender),
    })
}

fn order_violation(fiber: &ActiveFiber, index: usize) -> RenderError {
    RenderError::HookOrderViolation {
        component: fiber.component.clone(),
        index,
    }
}

// ---------------------------------------------------------------------------
// use_state
// ---------------------------------------------------------------------------

/// Handle that queues updates to one `use_state` slot and requests a render.
pub struct StateSetter<T> {
    queue: Rc<RefCell<Vec<StateUpdate<T>>>>,
    scheduler: Scheduler,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter").finish_non_exhaustive()
    }
}

impl<T: 'static> StateSetter<T> {
    /// Replace the value on the next render.
    pub fn set(&self, value: T) {
        self.queue.borrow_mut().push(StateUpdate::Set(value));
        self.scheduler.request_render();
    }

    /// Derive the next value from the current one. Updates queued in the
    /// same batch compose in FIFO order.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.queue.borrow_mut().push(StateUpdate::Apply(Box::new(f)));
        self.scheduler.request_render();
    }
}

/// Component-local state.
///
/// `init` runs only on the first render. Returns the current value (after
/// draining any queued updates) and a setter that is valid beyond the render.
pub fn use_state<T: Clone + 'static>(
    init: impl FnOnce() -> T,
) -> Result<(T, StateSetter<T>), RenderError> {
    with_active(|fiber| {
        let idx = fiber.cursor.get();
        fiber.cursor.set(idx + 1);

        if fiber.slots.borrow().len() == idx {
            if fiber.mounted {
                return Err(order_violation(fiber, idx));
            }
            let initial = init();
            fiber.slots.borrow_mut().push(HookSlot::State {
                value: Rc::new(RefCell::new(initial)),
                queue: Rc::new(RefCell::new(Vec::<StateUpdate<T>>::new())),
            });
        }

        let (value, queue) = {
            let slots = fiber.slots.borrow();
            let HookSlot::State { value, queue } = &slots[idx] else {
                return Err(order_violation(fiber, idx));
            };
            let value = value
                .clone()
                .downcast::<RefCell<T>>()
                .map_err(|_| order_violation(fiber, idx))?;
            let queue = queue
                .clone()
                .downcast::<RefCell<Vec<StateUpdate<T>>>>()
                .map_err(|_| order_violation(fiber, idx))?;
            (value, queue)
        };

        let mut pending = queue.borrow_mut();
        if !pending.is_empty() {
            let mut current = value.borrow_mut();
            for update in pending.drain(..) {
                match update {
                    StateUpdate::Set(v) => *current = v,
                    StateUpdate::Apply(f) => {
                        let next = f(&current);
                        *current = next;
                    }
                }
            }
        }
        drop(pending);

        let snapshot = value.borrow().clone();
        Ok((
            snapshot,
            StateSetter {
                queue,
                scheduler: fiber.scheduler.clone(),
            },
        ))
    })
}

// ---------------------------------------------------------------------------
// use_effect
// ---------------------------------------------------------------------------

/// Schedule a side effect to run after commit.
///
/// `deps == None` runs after every commit; `Some(vec![])` runs once on
/// mount; otherwise the effect re-runs when the dependency list changes.
/// The previous cleanup runs before the effect re-runs and on unmount.
pub fn use_effect(
    effect: impl FnOnce() -> Option<CleanupFn> + 'static,
    deps: Option<Vec<Dep>>,
) -> Result<(), RenderError> {
    with_active(|fiber| {
        let idx = fiber.cursor.get();
        fiber.cursor.set(idx + 1);

        let mut slots = fiber.slots.borrow_mut();
        if slots.len() == idx {
            if fiber.mounted {
                return Err(order_violation(fiber, idx));
            }
            slots.push(HookSlot::Effect {
                callback: Some(Box::new(effect)),
                cleanup: None,
                deps,
                scheduled: true,
            });
            return Ok(());
        }

        let HookSlot::Effect {
            callback,
            deps: stored,
            scheduled,
            ..
        } = &mut slots[idx]
        else {
            return Err(order_violation(fiber, idx));
        };

        let changed = match (&*stored, &deps) {
            (_, None) => true,
            (None, Some(_)) => true,
            (Some(a), Some(b)) => a != b,
        };
        if changed {
            *callback = Some(Box::new(effect));
            *scheduled = true;
        } else {
            *callback = None;
            *scheduled = false;
        }
        *stored = deps;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// use_memo / use_callback
// ---------------------------------------------------------------------------

/// Cache a computed value, recomputing only when `deps` change.
pub fn use_memo<T: Clone + 'static>(
    factory: impl FnOnce() -> T,
    deps: Vec<Dep>,
) -> Result<T, RenderError> {
    with_active(|fiber| {
        let idx = fiber.cursor.get();
        fiber.cursor.set(idx + 1);

        let fresh = fiber.slots.borrow().len() == idx;
        if fresh {
            if fiber.mounted {
                return Err(order_violation(fiber, idx));
            }
            let value = factory();
            fiber.slots.borrow_mut().push(HookSlot::Memo {
                value: Rc::new(value.clone()),
                deps,
            });
            return Ok(value);
        }

        let stale = {
            let slots = fiber.slots.borrow();
            let HookSlot::Memo { deps: stored, .. } = &slots[idx] else {
                return Err(order_violation(fiber, idx));
            };
            *stored != deps
        };
        if stale {
            let value = factory();
            fiber.slots.borrow_mut()[idx] = HookSlot::Memo {
                value: Rc::new(value.clone()),
                deps,
            };
            return Ok(value);
        }

        let slots = fiber.slots.borrow();
        let HookSlot::Memo { value, .. } = &slots[idx] else {
            return Err(order_violation(fiber, idx));
        };
        let value = value
            .clone()
            .downcast::<T>()
            .map_err(|_| order_violation(fiber, idx))?;
        Ok((*value).clone())
    })
}

/// Cache a closure by identity, recreating it only when `deps` change.
pub fn use_callback<F: 'static>(f: F, deps: Vec<Dep>) -> Result<Rc<F>, RenderError> {
    use_memo(move || Rc::new(f), deps)
}

// ---------------------------------------------------------------------------
// use_context
// ---------------------------------------------------------------------------

/// Read the nearest enclosing provider's value for `ctx`, or the context
/// default when no provider encloses this component. Consumes no slot.
pub fn use_context<T: Clone + 'static>(ctx: &Context<T>) -> Result<T, RenderError> {
    with_active(|fiber| {
        for (id, value) in &fiber.providers {
            if *id == ctx.id() {
                if let Some(v) = value.downcast_ref::<T>() {
                    return Ok(v.clone());
                }
            }
        }
        Ok(ctx.default_value())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Slots = Rc<RefCell<Vec<HookSlot>>>;

    fn render_with<R>(slots: &Slots, mounted: bool, body: impl FnOnce() -> R) -> R {
        activate(
            slots.clone(),
            mounted,
            "Test".to_string(),
            Scheduler::new(),
            Vec::new(),
        );
        let out = body();
        deactivate().expect("hook count should be stable");
        out
    }

    // --- use_state ---

    #[test]
    fn state_initializes_once() {
        let slots: Slots = Rc::default();
        let (v, _) = render_with(&slots, false, || use_state(|| 5i32).unwrap());
        assert_eq!(v, 5);
        // The initializer must not run again on re-render.
        let (v, _) = render_with(&slots, true, || use_state(|| 99i32).unwrap());
        assert_eq!(v, 5);
    }

    #[test]
    fn queued_updates_apply_in_fifo_order() {
        let slots: Slots = Rc::default();
        let (_, setter) = render_with(&slots, false, || use_state(|| 0i32).unwrap());
        setter.set(10);
        setter.update(|n| n + 1);
        setter.update(|n| n * 2);
        let (v, _) = render_with(&slots, true, || use_state(|| 0i32).unwrap());
        assert_eq!(v, 22);
    }

    #[test]
    fn setter_outlives_render() {
        let slots: Slots = Rc::default();
        let (_, setter) = render_with(&slots, false, || use_state(|| 1i32).unwrap());
        assert!(format!("{setter:?}").contains("StateSetter"));
        // No active fiber here.
        setter.set(7);
        let (v, _) = render_with(&slots, true, || use_state(|| 0i32).unwrap());
        assert_eq!(v, 7);
    }

    #[test]
    fn hooks_outside_render_fail() {
        let err = use_state(|| 0i32).unwrap_err();
        assert!(matches!(err, RenderError::HooksOutsideRender));
    }

    #[test]
    fn new_hook_on_rerender_is_an_order_violation() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_state(|| 0i32).unwrap();
        });
        activate(
            slots.clone(),
            true,
            "Test".to_string(),
            Scheduler::new(),
            Vec::new(),
        );
        use_state(|| 0i32).unwrap();
        let err = use_state(|| 0i32).unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookOrderViolation { index: 1, .. }
        ));
        let _ = deactivate();
    }

    #[test]
    fn skipped_hook_is_caught_at_deactivate() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_state(|| 0i32).unwrap();
            use_state(|| 1i32).unwrap();
        });
        activate(
            slots.clone(),
            true,
            "Test".to_string(),
            Scheduler::new(),
            Vec::new(),
        );
        use_state(|| 0i32).unwrap();
        let err = deactivate().unwrap_err();
        assert!(matches!(
            err,
            RenderError::HookOrderViolation { index: 1, .. }
        ));
    }

    #[test]
    fn slot_kind_mismatch_is_an_order_violation() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_state(|| 0i32).unwrap();
        });
        activate(
            slots.clone(),
            true,
            "Test".to_string(),
            Scheduler::new(),
            Vec::new(),
        );
        let err = use_memo(|| 1i32, vec![]).unwrap_err();
        assert!(matches!(err, RenderError::HookOrderViolation { .. }));
        let _ = deactivate();
    }

    // --- use_effect ---

    fn effect_state(slots: &Slots, idx: usize) -> (bool, bool) {
        let slots = slots.borrow();
        match &slots[idx] {
            HookSlot::Effect {
                scheduled,
                callback,
                ..
            } => (*scheduled, callback.is_some()),
            _ => panic!("expected an effect slot"),
        }
    }

    #[test]
    fn effect_with_empty_deps_runs_once() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_effect(|| None, Some(vec![])).unwrap();
        });
        assert_eq!(effect_state(&slots, 0), (true, true));

        render_with(&slots, true, || {
            use_effect(|| None, Some(vec![])).unwrap();
        });
        assert_eq!(effect_state(&slots, 0), (false, false));
    }

    #[test]
    fn effect_without_deps_reschedules_every_render() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_effect(|| None, None).unwrap();
        });
        render_with(&slots, true, || {
            use_effect(|| None, None).unwrap();
        });
        assert_eq!(effect_state(&slots, 0), (true, true));
    }

    #[test]
    fn effect_reschedules_when_deps_change() {
        let slots: Slots = Rc::default();
        render_with(&slots, false, || {
            use_effect(|| None, Some(vec![Dep::Int(1)])).unwrap();
        });
        render_with(&slots, true, || {
            use_effect(|| None, Some(vec![Dep::Int(1)])).unwrap();
        });
        assert_eq!(effect_state(&slots, 0), (false, false));

        render_with(&slots, true, || {
            use_effect(|| None, Some(vec![Dep::Int(2)])).unwrap();
        });
        assert_eq!(effect_state(&slots, 0), (true, true));
    }

    // --- use_memo / use_callback ---

    #[test]
    fn memo_caches_until_deps_change() {
        let slots: Slots = Rc::default();
        let runs = Rc::new(Cell::new(0));

        let compute = |runs: Rc<Cell<i32>>, dep: i64| {
            move || {
                runs.set(runs.get() + 1);
                dep * 10
            }
        };

        let v = render_with(&slots, false, || {
            use_memo(compute(runs.clone(), 1), vec![Dep::Int(1)]).unwrap()
        });
        assert_eq!(v, 10);
        let v = render_with(&slots, true, || {
            use_memo(compute(runs.clone(), 1), vec![Dep::Int(1)]).unwrap()
        });
        assert_eq!(v, 10);
        assert_eq!(runs.get(), 1);

        let v = render_with(&slots, true, || {
            use_memo(compute(runs.clone(), 2), vec![Dep::Int(2)]).unwrap()
        });
        assert_eq!(v, 20);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn callback_identity_is_stable() {
        fn adder(n: i32) -> impl Fn() -> i32 {
            move || n
        }
        let slots: Slots = Rc::default();
        let a = render_with(&slots, false, || {
            use_callback(adder(1), vec![Dep::Unit]).unwrap()
        });
        let b = render_with(&slots, true, || {
            use_callback(adder(2), vec![Dep::Unit]).unwrap()
        });
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(b(), 1);
    }

    // --- use_context ---

    #[test]
    fn context_reads_innermost_provider_or_default() {
        let ctx = Context::new("fallback".to_string());
        let slots: Slots = Rc::default();

        let v = render_with(&slots, false, || use_context(&ctx).unwrap());
        assert_eq!(v, "fallback");

        let providers: Vec<(u64, Rc<dyn Any>)> = vec![
            (ctx.id(), Rc::new("inner".to_string())),
            (ctx.id(), Rc::new("outer".to_string())),
        ];
        activate(
            Rc::default(),
            false,
            "Test".to_string(),
            Scheduler::new(),
            providers,
        );
        let v = use_context(&ctx).unwrap();
        deactivate().unwrap();
        assert_eq!(v, "inner");
    }

    #[test]
    fn deps_conversions() {
        assert_eq!(Dep::from(3i32), Dep::Int(3));
        assert_eq!(Dep::from(3usize), Dep::Uint(3));
        assert_eq!(Dep::from("x"), Dep::Str("x".into()));
        assert_eq!(Dep::from(true), Dep::Bool(true));
        assert_eq!(Dep::from(()), Dep::Unit);
    }
}
