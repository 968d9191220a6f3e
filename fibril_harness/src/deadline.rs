// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::Cell;
use core::time::Duration;

use fibril_core::IdleDeadline;

/// A deadline that allows a fixed number of units of work per slice.
///
/// Every query consumes one millisecond from a budget of `units`
/// milliseconds. The work loop queries the deadline once after each unit, so
/// under [`SchedulerConfig::idle_callback`](fibril_core::SchedulerConfig::idle_callback)
/// (yield below 1 ms) a slice performs exactly `units` units. A zero budget
/// still performs one unit, like any slice.
#[derive(Debug)]
pub struct UnitDeadline {
    remaining_ms: Cell<u64>,
}

impl UnitDeadline {
    /// Creates a deadline with room for `units` units.
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self {
            remaining_ms: Cell::new(units as u64),
        }
    }

    /// Returns the budget left, in units.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining_ms.get()
    }
}

impl IdleDeadline for UnitDeadline {
    fn time_remaining(&self) -> Duration {
        let remaining = self.remaining_ms.get().saturating_sub(1);
        self.remaining_ms.set(remaining);
        Duration::from_millis(remaining)
    }
}

/// A deadline that always reports the same remaining time.
#[derive(Clone, Copy, Debug)]
pub struct FixedDeadline(pub Duration);

impl IdleDeadline for FixedDeadline {
    fn time_remaining(&self) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_deadline_counts_down() {
        let deadline = UnitDeadline::new(3);
        assert_eq!(deadline.time_remaining(), Duration::from_millis(2));
        assert_eq!(deadline.time_remaining(), Duration::from_millis(1));
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        assert_eq!(deadline.remaining(), 0);
    }

    #[test]
    fn fixed_deadline_never_changes() {
        let deadline = FixedDeadline(Duration::from_micros(500));
        assert_eq!(deadline.time_remaining(), Duration::from_micros(500));
        assert_eq!(deadline.time_remaining(), Duration::from_micros(500));
    }
}
