//! Observer-facing outputs: the 0..=15 analog level and the edge-triggered
//! activity flag.

use serde::{Deserialize, Serialize};

/// `round(15 * value / max)`, rounding halves up. Zero when `max == 0`.
pub fn analog_signal(value: u64, max: u64) -> u8 {
    if max == 0 {
        return 0;
    }
    let value = value.min(max);
    ((value * 30 + max) / (2 * max)) as u8
}

/// Remembers the last published activity state so observers are only
/// notified on flips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLatch {
    active: bool,
}

impl ActivityLatch {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Record the new state. Returns `Some(state)` only when it changed.
    pub fn update(&mut self, active: bool) -> Option<bool> {
        if self.active == active {
            return None;
        }
        self.active = active;
        Some(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analog_signal_bounds() {
        assert_eq!(analog_signal(0, 1000), 0);
        assert_eq!(analog_signal(1000, 1000), 15);
        assert_eq!(analog_signal(2000, 1000), 15);
        assert_eq!(analog_signal(5, 0), 0);
    }

    #[test]
    fn analog_signal_rounds_half_up() {
        // 15 * 100 / 1000 = 1.5
        assert_eq!(analog_signal(100, 1000), 2);
        // 15 * 30 / 1000 = 0.45
        assert_eq!(analog_signal(30, 1000), 0);
    }

    #[test]
    fn latch_reports_only_edges() {
        let mut latch = ActivityLatch::default();
        assert_eq!(latch.update(false), None);
        assert_eq!(latch.update(true), Some(true));
        assert_eq!(latch.update(true), None);
        assert_eq!(latch.update(false), Some(false));
    }
}
