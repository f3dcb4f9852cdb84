//! Simulation clock shared between the update loop and scheduled tasks
//!
//! The clock only moves when the owner calls [`SimClock::advance`]. Tasks that
//! wait on it never block: they are polled from the update loop.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Monotonic simulation time, cheap to clone (clones share the same time)
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    elapsed: Rc<Cell<Duration>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time
    pub fn now(&self) -> Duration {
        self.elapsed.get()
    }

    /// Move time forward by `dt`
    pub fn advance(&self, dt: Duration) -> Duration {
        let now = self.elapsed.get().saturating_add(dt);
        self.elapsed.set(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        assert_eq!(SimClock::new().now(), Duration::ZERO);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::new();
        let view = clock.clone();
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(250));
        assert_eq!(view.now(), Duration::from_millis(500));
    }
}
