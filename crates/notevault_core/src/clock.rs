//! Time source for history and lifecycle transitions.
//!
//! Timestamps are Unix epoch milliseconds throughout core.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current instant to orchestration code.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock.
///
/// Each `now_ms` call returns the current value and then advances it by
/// `step_ms`, so consecutive operations observe distinct instants.
#[derive(Debug)]
pub struct ManualClock {
    current: AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            current: AtomicI64::new(start_ms),
            step_ms,
        }
    }

    /// Clock frozen at `at_ms`.
    pub fn fixed(at_ms: i64) -> Self {
        Self::new(at_ms, 0)
    }

    pub fn set(&self, at_ms: i64) {
        self.current.store(at_ms, Ordering::SeqCst);
    }

    pub fn peek(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn manual_clock_advances_by_step() {
        let clock = ManualClock::new(100, 5);
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.now_ms(), 105);
        assert_eq!(clock.peek(), 110);
    }

    #[test]
    fn fixed_clock_does_not_move() {
        let clock = ManualClock::fixed(42);
        assert_eq!(clock.now_ms(), 42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
