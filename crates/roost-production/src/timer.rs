use roost_core::error::StateError;
use roost_core::persist::{TimerRecord, clamp_field};
use serde::{Deserialize, Serialize};

/// Progress scale: [`TimerState::progress`] is in `0..=PROGRESS_MAX`.
pub const PROGRESS_MAX: u32 = 1000;

/// Elapsed/target pair of a production cycle. A zero target means no cycle
/// is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub elapsed: u32,
    pub target: u32,
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        self.target > 0 || self.elapsed > 0
    }

    pub fn is_complete(&self) -> bool {
        self.target > 0 && self.elapsed >= self.target
    }

    /// Per-mille progress toward the target.
    pub fn progress(&self) -> u32 {
        if self.target == 0 {
            return 0;
        }
        let p = self.elapsed as u64 * PROGRESS_MAX as u64 / self.target as u64;
        p.min(PROGRESS_MAX as u64) as u32
    }

    pub fn advance(&mut self, ticks: u32) {
        self.elapsed = self.elapsed.saturating_add(ticks);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record(&self) -> TimerRecord {
        TimerRecord {
            elapsed: self.elapsed,
            target: self.target,
        }
    }

    /// Load a saved timer. An elapsed count past the target (or any elapsed
    /// count with no target) is clamped.
    pub fn restore(record: TimerRecord) -> (Self, Option<StateError>) {
        let (elapsed, err) = clamp_field("timer elapsed", record.elapsed, record.target);
        (
            Self {
                elapsed,
                target: record.target,
            },
            err,
        )
    }
}
