//! Persisted records: the opaque structured state a machine saves and
//! restores. Encoding is the engine's concern; these are plain serde types.

use serde::{Deserialize, Serialize};

use crate::buffer::ResourceBuffer;
use crate::error::StateError;
use crate::event::PlanMode;
use crate::id::ResourceTypeId;

/// A saved [`ResourceBuffer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRecord {
    pub capacity: u32,
    pub amount: u32,
    pub resource: Option<ResourceTypeId>,
}

impl From<&ResourceBuffer> for BufferRecord {
    fn from(buffer: &ResourceBuffer) -> Self {
        Self {
            capacity: buffer.capacity(),
            amount: buffer.amount(),
            resource: buffer.resource(),
        }
    }
}

impl BufferRecord {
    /// Restore into a buffer built from the current configuration. The saved
    /// capacity is informational only: the configured one wins, and the
    /// amount is clamped to it.
    pub fn restore_into(&self, buffer: &mut ResourceBuffer) -> Vec<StateError> {
        if self.capacity != buffer.capacity() {
            log::debug!(
                "buffer capacity changed since save: {} -> {}",
                self.capacity,
                buffer.capacity()
            );
        }
        buffer.restore(self.amount, self.resource)
    }
}

/// A saved production timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub elapsed: u32,
    pub target: u32,
}

/// A saved dousing progress. Only the mode of the last plan is kept, for
/// display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub mode: PlanMode,
    pub progress: u32,
}

/// Clamp `value` to `max`, reporting the clamp.
pub fn clamp_field(field: &'static str, value: u32, max: u32) -> (u32, Option<StateError>) {
    if value <= max {
        return (value, None);
    }
    (
        max,
        Some(StateError::MalformedPersistedState {
            field,
            value: value as u64,
            clamped: max as u64,
        }),
    )
}
