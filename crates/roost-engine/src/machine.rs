//! The closed set of machines the engine can place.
//!
//! [`Machine`] is a tagged enum over the three machine families. The engine
//! only talks to machines through it: tick, neighbor ports, slots,
//! configuration reload and save/restore.

use roost_converter::{ConverterMachine, ConverterRecord, ConverterVariant};
use roost_core::config::RoostConfig;
use roost_core::error::StateError;
use roost_core::event::MachineEvent;
use roost_core::id::ResourceKind;
use roost_core::item::Batch;
use roost_core::registry::Registry;
use roost_core::transfer::{Neighbors, ResourceHandler};
use roost_dousing::{DousingPlanner, DousingRecord};
use roost_production::{ContainerLayout, ProductionRecord, TimedProductionController};
use serde::{Deserialize, Serialize};

/// Everything needed to rebuild an empty machine of the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blueprint {
    Converter(ConverterVariant),
    Dousing,
    Production(ContainerLayout),
}

/// Saved state of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineRecord {
    Converter(ConverterRecord),
    Dousing(DousingRecord),
    Production(ProductionRecord),
}

#[derive(Debug, Clone)]
pub enum Machine {
    Converter(ConverterMachine),
    Dousing(DousingPlanner),
    Production(TimedProductionController),
}

impl Machine {
    /// Build an empty machine from a blueprint. `seed` feeds production
    /// lay-time sampling.
    pub fn build(blueprint: &Blueprint, config: &RoostConfig, seed: u64) -> Self {
        match blueprint {
            Blueprint::Converter(variant) => {
                Machine::Converter(ConverterMachine::new(*variant, &config.converters))
            }
            Blueprint::Dousing => Machine::Dousing(DousingPlanner::new(&config.dousing)),
            Blueprint::Production(layout) => {
                Machine::Production(TimedProductionController::new(
                    layout.clone(),
                    &config.production,
                    seed,
                ))
            }
        }
    }

    pub fn blueprint(&self) -> Blueprint {
        match self {
            Machine::Converter(c) => Blueprint::Converter(c.variant()),
            Machine::Dousing(_) => Blueprint::Dousing,
            Machine::Production(p) => Blueprint::Production(p.layout().clone()),
        }
    }

    pub fn tick(
        &mut self,
        registry: &mut Registry,
        neighbors: &mut dyn Neighbors,
    ) -> Vec<MachineEvent> {
        match self {
            Machine::Converter(c) => c.tick(registry, neighbors),
            Machine::Dousing(d) => d.tick(registry),
            Machine::Production(p) => p.tick(registry),
        }
    }

    /// The handler this machine offers a neighbor for `kind`.
    pub fn port(&mut self, kind: ResourceKind) -> Option<Box<dyn ResourceHandler + '_>> {
        match self {
            Machine::Converter(c) if c.variant().kind() == kind => Some(Box::new(c.port())),
            Machine::Converter(_) => None,
            Machine::Dousing(d) => d.port(kind),
            Machine::Production(_) => None,
        }
    }

    pub fn analog_signal(&self) -> u8 {
        match self {
            Machine::Converter(c) => c.analog_signal(),
            Machine::Dousing(d) => d.analog_signal(),
            Machine::Production(p) => p.analog_signal(),
        }
    }

    pub fn apply_config(&mut self, config: &RoostConfig) {
        match self {
            Machine::Converter(c) => c.apply_config(&config.converters),
            Machine::Dousing(d) => d.apply_config(&config.dousing),
            Machine::Production(p) => p.apply_config(&config.production),
        }
    }

    // -- Slots --

    pub fn get_batch(&self, slot: usize) -> Option<&Batch> {
        match self {
            Machine::Converter(c) => c.get_batch(slot),
            Machine::Dousing(d) => d.get_batch(slot),
            Machine::Production(p) => p.get_batch(slot),
        }
    }

    #[must_use = "the returned batch was rejected by the slot"]
    pub fn set_batch(&mut self, slot: usize, batch: Option<Batch>) -> Option<Batch> {
        match self {
            Machine::Converter(c) => c.set_batch(slot, batch),
            Machine::Dousing(d) => d.set_batch(slot, batch),
            Machine::Production(p) => p.set_batch(slot, batch),
        }
    }

    pub fn remove_batch(&mut self, slot: usize, count: u32) -> Option<Batch> {
        match self {
            Machine::Converter(c) => c.remove_batch(slot, count),
            Machine::Dousing(d) => d.remove_batch(slot, count),
            Machine::Production(p) => p.remove_batch(slot, count),
        }
    }

    // -- Persistence --

    pub fn record(&self) -> MachineRecord {
        match self {
            Machine::Converter(c) => MachineRecord::Converter(c.record()),
            Machine::Dousing(d) => MachineRecord::Dousing(d.record()),
            Machine::Production(p) => MachineRecord::Production(p.record()),
        }
    }

    /// Restore saved state. A record for a different machine family is
    /// ignored with a warning.
    pub fn restore(&mut self, record: &MachineRecord) -> Vec<StateError> {
        match (self, record) {
            (Machine::Converter(c), MachineRecord::Converter(r)) => c.restore(r),
            (Machine::Dousing(d), MachineRecord::Dousing(r)) => d.restore(r),
            (Machine::Production(p), MachineRecord::Production(r)) => p.restore(r),
            (machine, _) => {
                log::warn!("record does not match machine {:?}", machine.blueprint());
                Vec::new()
            }
        }
    }

    // -- Accessors --

    pub fn as_converter(&self) -> Option<&ConverterMachine> {
        match self {
            Machine::Converter(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_converter_mut(&mut self) -> Option<&mut ConverterMachine> {
        match self {
            Machine::Converter(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dousing(&self) -> Option<&DousingPlanner> {
        match self {
            Machine::Dousing(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dousing_mut(&mut self) -> Option<&mut DousingPlanner> {
        match self {
            Machine::Dousing(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_production(&self) -> Option<&TimedProductionController> {
        match self {
            Machine::Production(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_production_mut(&mut self) -> Option<&mut TimedProductionController> {
        match self {
            Machine::Production(p) => Some(p),
            _ => None,
        }
    }
}
