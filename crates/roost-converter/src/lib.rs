//! Converters for the Roost engine.
//!
//! A converter cracks the item in its single input slot into its buffer and
//! pushes buffered resource to its neighbors. Three variants exist: power,
//! fluid and, with the `chemical` feature, chemical.
//!
//! # Tick order
//!
//! 1. **Crack**: all-or-nothing. The full `amount * count` must fit or the
//!    input waits for the next tick.
//! 2. **Push**: each face in [`Direction::ALL`] order is offered
//!    `min(transfer_rate, amount)` through the two-phase transfer.
//! 3. **Activity**: recomputed, with an event only when it flips.
//!
//! [`Direction::ALL`]: roost_core::id::Direction::ALL

pub mod variant;

use roost_core::buffer::{ResourceBuffer, ResourceStack};
use roost_core::config::ConverterConfig;
use roost_core::error::StateError;
use roost_core::event::MachineEvent;
use roost_core::id::ItemTypeId;
use roost_core::item::{Batch, Slot, SlotRole};
use roost_core::persist::BufferRecord;
use roost_core::registry::{CrackOutput, Registry};
use roost_core::signal::ActivityLatch;
use roost_core::transfer::{ExtractOnly, Neighbors, push_to_neighbors};
use serde::{Deserialize, Serialize};

pub use variant::ConverterVariant;

/// Saved converter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterRecord {
    pub buffer: BufferRecord,
    pub input: Option<Batch>,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConverterMachine {
    variant: ConverterVariant,
    buffer: ResourceBuffer,
    input: Slot,
    latch: ActivityLatch,
    show_activity: bool,
}

impl ConverterMachine {
    pub fn new(variant: ConverterVariant, config: &ConverterConfig) -> Self {
        let spec = variant.buffer_spec(config);
        Self {
            variant,
            buffer: ResourceBuffer::new(variant.kind(), spec.capacity, spec.transfer_rate),
            input: Slot::new(SlotRole::Unique),
            latch: ActivityLatch::default(),
            show_activity: config.show_activity,
        }
    }

    pub fn variant(&self) -> ConverterVariant {
        self.variant
    }

    pub fn buffer(&self) -> &ResourceBuffer {
        &self.buffer
    }

    pub fn is_active(&self) -> bool {
        self.latch.is_active()
    }

    pub fn analog_signal(&self) -> u8 {
        self.buffer.analog_signal()
    }

    /// The buffer as neighbors see it: drainable, never fillable.
    pub fn port(&mut self) -> ExtractOnly<'_> {
        ExtractOnly(&mut self.buffer)
    }

    /// What `item` cracks into on this converter, if anything.
    pub fn crack_output(&self, item: ItemTypeId, registry: &Registry) -> Option<CrackOutput> {
        let kind = self.variant.kind();
        registry
            .find_crack_override(item)
            .filter(|out| out.kind == kind)
            .or_else(|| registry.default_crack(item).filter(|out| out.kind == kind))
    }

    /// Whether the input slot would take `item` at all.
    pub fn accepts(&self, item: ItemTypeId, registry: &Registry) -> bool {
        self.crack_output(item, registry).is_some()
    }

    // -- Slot operations (slot 0 is the input) --

    pub fn get_batch(&self, slot: usize) -> Option<&Batch> {
        (slot == 0).then(|| self.input.batch()).flatten()
    }

    #[must_use = "the returned batch was rejected by the slot"]
    pub fn set_batch(&mut self, slot: usize, batch: Option<Batch>) -> Option<Batch> {
        if slot != 0 {
            return batch;
        }
        self.input.set(batch)
    }

    pub fn remove_batch(&mut self, slot: usize, count: u32) -> Option<Batch> {
        if slot != 0 {
            return None;
        }
        self.input.remove(count)
    }

    /// Pick up a reloaded configuration and re-clamp the buffer.
    pub fn apply_config(&mut self, config: &ConverterConfig) {
        let spec = self.variant.buffer_spec(config);
        self.buffer.set_transfer_rate(spec.transfer_rate);
        if let Some(err) = self.buffer.set_capacity(spec.capacity) {
            err.report();
        }
        self.show_activity = config.show_activity;
    }

    // -- Tick --

    pub fn tick(
        &mut self,
        registry: &Registry,
        neighbors: &mut dyn Neighbors,
    ) -> Vec<MachineEvent> {
        let mut events = Vec::new();

        let cracked = self.crack(registry, &mut events);

        let kind = self.variant.kind();
        let exports = push_to_neighbors(&mut self.buffer, neighbors);
        let exported = !exports.is_empty();
        events.extend(exports.into_iter().map(|e| MachineEvent::Exported {
            direction: e.direction,
            kind,
            output: ResourceStack {
                resource: e.resource,
                amount: e.amount,
            },
        }));

        let pending = self
            .input
            .batch()
            .is_some_and(|b| self.accepts(b.item, registry))
            && !self.buffer.is_full();
        let active =
            (cracked || exported || pending || !self.buffer.is_empty()) && self.show_activity;
        if let Some(active) = self.latch.update(active) {
            events.push(MachineEvent::ActivityChanged { active });
        }
        events
    }

    fn crack(&mut self, registry: &Registry, events: &mut Vec<MachineEvent>) -> bool {
        let Some(batch) = self.input.batch() else {
            return false;
        };
        let item = batch.item;
        let Some(out) = self.crack_output(item, registry) else {
            return false;
        };
        let total = out.amount.saturating_mul(batch.count);
        if let Err(err) = self.buffer.fill_exact(out.resource, total) {
            log::debug!("crack of {item:?} deferred: {err}");
            return false;
        }
        self.input.take();
        events.push(MachineEvent::Cracked {
            item,
            output: ResourceStack {
                resource: out.resource,
                amount: total,
            },
        });
        true
    }

    // -- Persistence --

    pub fn record(&self) -> ConverterRecord {
        ConverterRecord {
            buffer: BufferRecord::from(&self.buffer),
            input: self.input.batch().cloned(),
            active: self.latch.is_active(),
        }
    }

    pub fn restore(&mut self, record: &ConverterRecord) -> Vec<StateError> {
        let mut errors = record.buffer.restore_into(&mut self.buffer);
        if let Some(rejected) = self.input.set(record.input.clone()) {
            errors.push(StateError::MalformedPersistedState {
                field: "converter input count",
                value: rejected.count as u64 + self.input.count() as u64,
                clamped: self.input.count() as u64,
            });
        }
        self.latch = ActivityLatch::default();
        self.latch.update(record.active);
        for e in &errors {
            e.report();
        }
        errors
    }
}
