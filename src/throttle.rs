//! Leading-edge rate limiting for frame writes.

use std::time::{Duration, Instant};

/// Admits at most one event per interval, letting the first one through
/// immediately. Callers pass the clock in, which keeps tests deterministic.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
        }
    }

    /// Whether an event at `now` may pass. Admitted events start a new
    /// interval; rejected ones do not extend it.
    pub fn acquire(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }

    /// Whether the interval has elapsed without admitting anything.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        }
    }
}
