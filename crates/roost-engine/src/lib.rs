//! Roost Engine -- a grid of machines stepped one tick at a time.
//!
//! The engine owns the configuration, the registry and every placed
//! machine. Machines are keyed by [`MachineId`] and located by
//! [`BlockPos`]; two machines are neighbors when their positions differ by
//! one [`Direction`](roost_core::id::Direction) offset.
//!
//! # Step
//!
//! Machines tick in placement order. Each one is detached from storage for
//! the duration of its own tick so it can borrow its neighbors mutably;
//! the only cross-machine effect is the two-phase transfer through a
//! neighbor's port. Events are tagged with the tick and machine and queued
//! until [`Engine::drain_events`].

pub mod grid;
pub mod machine;
pub mod serialize;

use std::collections::HashMap;

use roost_core::config::RoostConfig;
use roost_core::error::TransferError;
use roost_core::event::MachineEvent;
use roost_core::fixed::Ticks;
use roost_core::id::{ItemTypeId, MachineId};
use roost_core::registry::{Registry, RegistryBuilder};
use roost_core::rng::SimRng;
use slotmap::{SecondaryMap, SlotMap};

pub use grid::BlockPos;
pub use machine::{Blueprint, Machine, MachineRecord};
pub use serialize::{DeserializeError, SerializeError, SnapshotHeader};

use grid::WorldNeighbors;

/// A machine event tagged with where and when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub tick: Ticks,
    pub machine: MachineId,
    pub event: MachineEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("position {0:?} is already occupied")]
    Occupied(BlockPos),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Engine {
    config: RoostConfig,
    registry: Registry,
    positions: SlotMap<MachineId, BlockPos>,
    machines: SecondaryMap<MachineId, Machine>,
    by_pos: HashMap<BlockPos, MachineId>,
    /// Tick order: placement order.
    order: Vec<MachineId>,
    tick: Ticks,
    paused: bool,
    /// Seeds for newly placed production machines.
    rng: SimRng,
    events: Vec<EngineEvent>,
}

impl Engine {
    pub fn new(config: RoostConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            positions: SlotMap::with_key(),
            machines: SecondaryMap::new(),
            by_pos: HashMap::new(),
            order: Vec::new(),
            tick: 0,
            paused: false,
            rng: SimRng::new(0),
            events: Vec::new(),
        }
    }

    /// Seed used for production lay-time sampling of machines placed from
    /// now on.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SimRng::new(seed);
        self
    }

    pub fn config(&self) -> &RoostConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -- Placement --

    /// Build and place an empty machine.
    pub fn place(
        &mut self,
        pos: BlockPos,
        blueprint: &Blueprint,
    ) -> Result<MachineId, EngineError> {
        if self.by_pos.contains_key(&pos) {
            return Err(EngineError::Occupied(pos));
        }
        let seed = self.rng.next_u64();
        let machine = Machine::build(blueprint, &self.config, seed);
        self.insert(pos, machine)
    }

    /// Place an already built machine.
    pub fn insert(&mut self, pos: BlockPos, machine: Machine) -> Result<MachineId, EngineError> {
        if self.by_pos.contains_key(&pos) {
            return Err(EngineError::Occupied(pos));
        }
        let id = self.positions.insert(pos);
        self.machines.insert(id, machine);
        self.by_pos.insert(pos, id);
        self.order.push(id);
        log::debug!("placed {id:?} at {pos:?}");
        Ok(id)
    }

    pub fn remove(&mut self, id: MachineId) -> Option<Machine> {
        let pos = self.positions.remove(id)?;
        self.by_pos.remove(&pos);
        self.order.retain(|&o| o != id);
        self.machines.remove(id)
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.get_mut(id)
    }

    pub fn machine_at(&self, pos: BlockPos) -> Option<MachineId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn position(&self, id: MachineId) -> Option<BlockPos> {
        self.positions.get(id).copied()
    }

    pub fn analog_signal(&self, id: MachineId) -> Option<u8> {
        self.machines.get(id).map(Machine::analog_signal)
    }

    /// Use a special item on a dousing machine. `None` when `id` is not a
    /// dousing machine.
    pub fn charge_special(
        &mut self,
        id: MachineId,
        item: ItemTypeId,
    ) -> Option<Result<u32, TransferError>> {
        let dousing = self.machines.get_mut(id)?.as_dousing_mut()?;
        Some(dousing.charge_special(item, &self.registry))
    }

    // -- Reload --

    /// Swap the configuration and re-clamp every machine.
    pub fn apply_config(&mut self, config: RoostConfig) {
        self.config = config;
        for machine in self.machines.values_mut() {
            machine.apply_config(&self.config);
        }
    }

    /// Swap registry content. Cached lookups are dropped.
    pub fn reload_registry(&mut self, builder: RegistryBuilder) {
        self.registry.reload(builder);
    }

    // -- Stepping --

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one tick of every machine. Returns the number of events raised.
    pub fn step(&mut self) -> usize {
        if self.paused {
            return 0;
        }
        let before = self.events.len();
        for &id in &self.order {
            let Some(pos) = self.positions.get(id).copied() else {
                continue;
            };
            let Some(mut machine) = self.machines.remove(id) else {
                continue;
            };
            let mut neighbors = WorldNeighbors {
                origin: pos,
                by_pos: &self.by_pos,
                machines: &mut self.machines,
            };
            let raised = machine.tick(&mut self.registry, &mut neighbors);
            self.machines.insert(id, machine);

            let tick = self.tick;
            self.events.extend(raised.into_iter().map(|event| EngineEvent {
                tick,
                machine: id,
                event,
            }));
        }
        self.tick += 1;
        self.events.len() - before
    }

    /// Run `ticks` steps.
    pub fn advance(&mut self, ticks: Ticks) -> usize {
        (0..ticks).map(|_| self.step()).sum()
    }

    /// Queued events, oldest first.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
