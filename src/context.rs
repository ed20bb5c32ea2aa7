//! Typed context values for `use_context`.
//!
//! A [`Context<T>`] pairs a process-unique id with a default value. Provider
//! elements carry a value for a context; components below them read it with
//! [`crate::hooks::use_context`], falling back to the default when no
//! provider is in scope.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A typed context with a default value.
///
/// Two `Context` values never share an id, even for the same `T`. Keep the
/// context in a place both the provider and the consumers can reach (often a
/// `thread_local` or a module-level `OnceCell`).
#[derive(Debug)]
pub struct Context<T> {
    id: u64,
    default: T,
}

impl<T: Clone + 'static> Context<T> {
    /// Create a new context with the given default value.
    pub fn new(default: T) -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            default,
        }
    }

    /// The process-unique id of this context.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Clone of the default value, used when no provider is in scope.
    pub(crate) fn default_value(&self) -> T {
        self.default.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Context::new(0i32);
        let b = Context::new(0i32);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn default_value_clones() {
        let ctx = Context::new(String::from("fallback"));
        assert_eq!(ctx.default_value(), "fallback");
    }
}
