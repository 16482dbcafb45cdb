//! Monotonic tick sources for call-tree timestamps.

use std::cell::Cell;
use std::time::Instant;

/// Monotonic clock read at tree construction, on clear and at snapshot time
pub trait TickSource {
    fn ticks(&self) -> i64;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn ticks(&self) -> i64 {
        (**self).ticks()
    }
}

/// Nanoseconds elapsed since the stopwatch was created
#[derive(Debug, Clone, Copy)]
pub struct StopwatchTicks {
    anchor: Instant,
}

impl StopwatchTicks {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for StopwatchTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for StopwatchTicks {
    fn ticks(&self) -> i64 {
        i64::try_from(self.anchor.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// Clock advanced by hand, for replaying recorded traces
#[derive(Debug, Default)]
pub struct ManualTicks {
    now: Cell<i64>,
}

impl ManualTicks {
    pub fn new(start: i64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, ticks: i64) {
        self.now.set(ticks);
    }

    pub fn advance(&self, delta: i64) {
        self.now.set(self.now.get() + delta);
    }
}

impl TickSource for ManualTicks {
    fn ticks(&self) -> i64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_is_monotonic() {
        let clock = StopwatchTicks::new();
        let first = clock.ticks();
        let second = clock.ticks();
        assert!(first >= 0);
        assert!(second >= first);
    }

    #[test]
    fn test_manual_ticks() {
        let clock = ManualTicks::new(10);
        clock.advance(5);
        assert_eq!(clock.ticks(), 15);
        clock.set(3);
        assert_eq!((&clock).ticks(), 3);
    }
}
