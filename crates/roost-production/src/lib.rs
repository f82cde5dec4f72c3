//! Timed production containers for the Roost engine.
//!
//! A [`TimedProductionController`] runs one production cycle at a time:
//! it waits until its source slots, fuel and output space are all ready,
//! accumulates elapsed ticks toward a sampled target, and on completion
//! lays one batch per source into its output slots.
//!
//! # Cycle
//!
//! ```text
//! IDLE --ready--> ACCUMULATING --elapsed >= target--> COMPLETING --> IDLE
//!   ^                  |
//!   +--no sources------+   (timer reset, CycleAborted)
//! ```
//!
//! Any other readiness loss (a missing source in a multi-slot container,
//! missing fuel, full outputs) pauses the cycle: elapsed stops growing and
//! the timer is kept until the container is ready again.
//!
//! Two reducers drive the timing and are deliberately different:
//! the target is the **max** over sources of one lay-time sample each, and
//! elapsed grows by the **min** over sources of `count * growth_rate`.

pub mod layout;
pub mod source;
pub mod timer;

use roost_core::config::ProductionConfig;
use roost_core::error::StateError;
use roost_core::event::MachineEvent;
use roost_core::fixed::{Fixed64, scale_ticks};
use roost_core::item::{Batch, SlotInventory};
use roost_core::persist::TimerRecord;
use roost_core::registry::Registry;
use roost_core::rng::SimRng;
use roost_core::signal;
use serde::{Deserialize, Serialize};

pub use layout::{ContainerKind, ContainerLayout, FuelRequirement};
pub use source::{GainTier, ProductionSource, YieldStats};
pub use timer::{PROGRESS_MAX, TimerState};

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

/// The three conditions a cycle needs. Recomputed every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub full_of_sources: bool,
    pub full_of_fuel: bool,
    pub output_space: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.full_of_sources && self.full_of_fuel && self.output_space
    }
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// Saved controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub slots: Vec<Option<Batch>>,
    pub timer: TimerRecord,
    pub rng_state: u64,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// A roost or breeder.
#[derive(Debug, Clone)]
pub struct TimedProductionController {
    layout: ContainerLayout,
    slots: SlotInventory,
    timer: TimerState,
    rng: SimRng,
    /// Configured multiplier for this container kind.
    speed: Fixed64,
    /// Multiplier applied on top of `speed` by the host (upgrades, effects).
    speed_modifier: Fixed64,
    readiness: Readiness,
    /// Sources seen on the previous tick.
    previous: Vec<ProductionSource>,
    /// Skip the next source-change recomputation. Armed by `restore`.
    suppress_recompute: bool,
}

impl TimedProductionController {
    pub fn new(layout: ContainerLayout, config: &ProductionConfig, seed: u64) -> Self {
        let mut layout = layout;
        layout.apply_config(config);
        let speed = layout.speed(config);
        Self {
            slots: SlotInventory::new(&layout.roles()),
            layout,
            timer: TimerState::default(),
            rng: SimRng::new(seed),
            speed,
            speed_modifier: Fixed64::ONE,
            readiness: Readiness::default(),
            previous: Vec::new(),
            suppress_recompute: false,
        }
    }

    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn progress(&self) -> u32 {
        self.timer.progress()
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// 0..=15 level derived from cycle progress.
    pub fn analog_signal(&self) -> u8 {
        signal::analog_signal(self.progress() as u64, PROGRESS_MAX as u64)
    }

    /// The effective lay-time divisor.
    pub fn effective_speed(&self) -> Fixed64 {
        self.speed.saturating_mul(self.speed_modifier)
    }

    pub fn set_speed_modifier(&mut self, modifier: Fixed64) {
        self.speed_modifier = modifier;
    }

    /// Pick up a reloaded configuration. The running timer is kept.
    pub fn apply_config(&mut self, config: &ProductionConfig) {
        self.layout.apply_config(config);
        self.speed = self.layout.speed(config);
    }

    // -- Slot operations --

    pub fn get_batch(&self, slot: usize) -> Option<&Batch> {
        self.slots.get_batch(slot)
    }

    /// Replace a slot. Returns what did not fit.
    #[must_use = "the returned batch was rejected by the slot"]
    pub fn set_batch(&mut self, slot: usize, batch: Option<Batch>) -> Option<Batch> {
        self.slots.set_batch(slot, batch)
    }

    pub fn remove_batch(&mut self, slot: usize, count: u32) -> Option<Batch> {
        self.slots.remove_batch(slot, count)
    }

    /// Merge into one slot. Returns what did not fit.
    #[must_use = "the returned batch was rejected by the slot"]
    pub fn insert_batch(&mut self, slot: usize, batch: Batch) -> Option<Batch> {
        match self.slots.slot_mut(slot) {
            Some(s) => s.insert(batch),
            None => Some(batch),
        }
    }

    pub fn slots(&self) -> &SlotInventory {
        &self.slots
    }

    // -- Tick --

    /// Run one tick.
    pub fn tick(&mut self, registry: &Registry) -> Vec<MachineEvent> {
        let mut events = Vec::new();

        let (sources, full_of_sources) = self.collect_sources(registry);
        self.readiness = Readiness {
            full_of_sources,
            full_of_fuel: self.has_fuel(),
            output_space: self.has_output_space(),
        };

        if sources.is_empty() {
            if self.timer.is_running() {
                log::debug!("production aborted: no sources left");
                events.push(MachineEvent::CycleAborted);
            }
            self.timer.reset();
            self.previous.clear();
            self.suppress_recompute = false;
            return events;
        }

        // Paused: the timer and the last ready source set are kept.
        if !self.readiness.is_ready() {
            return events;
        }

        let suppressed = std::mem::take(&mut self.suppress_recompute);
        let changed = sources != self.previous;
        if (changed && !suppressed) || self.timer.target == 0 {
            self.timer.target = self.sample_target(&sources);
        }

        let contribution = sources.iter().map(ProductionSource::contribution).min().unwrap_or(0);
        self.timer.advance(contribution);

        if self.timer.is_complete() {
            self.complete(&sources, &mut events);
        }

        self.previous = sources;
        events
    }

    /// Every recognized source, and whether every source slot had one.
    fn collect_sources(&self, registry: &Registry) -> (Vec<ProductionSource>, bool) {
        let mut sources = Vec::with_capacity(self.layout.source_roles.len());
        let mut full = true;
        for slot in self.layout.sources() {
            match self
                .slots
                .get_batch(slot)
                .and_then(|b| ProductionSource::from_batch(b, registry))
            {
                Some(src) => sources.push(src),
                None => full = false,
            }
        }
        let full = full && !sources.is_empty();
        (sources, full)
    }

    fn has_fuel(&self) -> bool {
        let (Some(fuel), Some(slot)) = (self.layout.fuel, self.layout.fuel_slot()) else {
            return true;
        };
        if fuel.amount == 0 {
            return true;
        }
        self.slots
            .get_batch(slot)
            .is_some_and(|b| b.item == fuel.item && b.count >= fuel.amount)
    }

    fn has_output_space(&self) -> bool {
        self.layout
            .outputs()
            .filter_map(|i| self.slots.slot(i))
            .any(|s| s.has_space())
    }

    fn sample_target(&mut self, sources: &[ProductionSource]) -> u32 {
        let longest = sources
            .iter()
            .map(|s| s.sample_lay_time(&mut self.rng))
            .max()
            .unwrap_or(0);
        scale_ticks(longest, self.effective_speed()).max(1)
    }

    fn complete(&mut self, sources: &[ProductionSource], events: &mut Vec<MachineEvent>) {
        if let (Some(fuel), Some(slot)) = (self.layout.fuel, self.layout.fuel_slot()) {
            self.slots.remove_batch(slot, fuel.amount);
        }

        let outputs = self.layout.outputs();
        let mut produced = Vec::with_capacity(sources.len());
        for src in sources {
            let batch = src.output();
            produced.push(batch.clone());
            if let Some(overflow) = self.slots.insert_into(outputs.clone(), batch) {
                log::debug!("output full, dropping {} x {:?}", overflow.count, overflow.item);
                events.push(MachineEvent::OutputDropped { batch: overflow });
            }
        }
        events.push(MachineEvent::CycleCompleted { produced });
        self.timer.reset();
    }

    // -- Persistence --

    pub fn record(&self) -> ProductionRecord {
        ProductionRecord {
            slots: self.slots.slots.iter().map(|s| s.batch().cloned()).collect(),
            timer: self.timer.record(),
            rng_state: self.rng.state(),
        }
    }

    /// Load saved state. The next tick keeps the restored target even though
    /// the source set looks new.
    pub fn restore(&mut self, record: &ProductionRecord) -> Vec<StateError> {
        let mut errors = Vec::new();
        for (i, batch) in record.slots.iter().enumerate() {
            if let Some(rejected) = self.slots.set_batch(i, batch.clone()) {
                let kept = self.slots.get_batch(i).map_or(0, |b| b.count as u64);
                errors.push(StateError::MalformedPersistedState {
                    field: "slot count",
                    value: rejected.count as u64 + kept,
                    clamped: kept,
                });
            }
        }
        let (timer, err) = TimerState::restore(record.timer);
        errors.extend(err);
        self.timer = timer;
        self.rng = SimRng::new(record.rng_state);
        self.previous.clear();
        self.suppress_recompute = true;
        for e in &errors {
            e.report();
        }
        errors
    }
}
