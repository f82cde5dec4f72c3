//! Slot layouts of the two production containers.
//!
//! Slot indices are laid out as `[sources..][fuel?][outputs..]`.

use std::ops::Range;

use roost_core::config::ProductionConfig;
use roost_core::fixed::Fixed64;
use roost_core::id::ItemTypeId;
use roost_core::item::SlotRole;
use serde::{Deserialize, Serialize};

/// Which container a layout describes. Selects the speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Roost,
    Breeder,
}

/// Fuel consumed per completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelRequirement {
    pub item: ItemTypeId,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLayout {
    pub kind: ContainerKind,
    pub source_roles: Vec<SlotRole>,
    pub fuel: Option<FuelRequirement>,
    pub output_slots: usize,
}

impl ContainerLayout {
    /// One bulk source slot, no fuel, four outputs.
    pub fn roost() -> Self {
        Self {
            kind: ContainerKind::Roost,
            source_roles: vec![SlotRole::Bulk],
            fuel: None,
            output_slots: 4,
        }
    }

    /// Two unique source slots, `seed` as fuel (two per cycle), three
    /// outputs.
    pub fn breeder(seed: ItemTypeId) -> Self {
        Self {
            kind: ContainerKind::Breeder,
            source_roles: vec![SlotRole::Unique, SlotRole::Unique],
            fuel: Some(FuelRequirement { item: seed, amount: 2 }),
            output_slots: 3,
        }
    }

    pub fn sources(&self) -> Range<usize> {
        0..self.source_roles.len()
    }

    pub fn fuel_slot(&self) -> Option<usize> {
        self.fuel.map(|_| self.source_roles.len())
    }

    pub fn outputs(&self) -> Range<usize> {
        let start = self.source_roles.len() + usize::from(self.fuel.is_some());
        start..start + self.output_slots
    }

    pub fn slot_count(&self) -> usize {
        self.outputs().end
    }

    /// Every slot role in index order.
    pub fn roles(&self) -> Vec<SlotRole> {
        let mut roles = self.source_roles.clone();
        if self.fuel.is_some() {
            roles.push(SlotRole::Bulk);
        }
        roles.extend(std::iter::repeat_n(SlotRole::Bulk, self.output_slots));
        roles
    }

    /// Configured speed multiplier for this container.
    pub fn speed(&self, config: &ProductionConfig) -> Fixed64 {
        match self.kind {
            ContainerKind::Roost => config.roost_speed(),
            ContainerKind::Breeder => config.breeder_speed(),
        }
    }

    /// Pick up configured fuel amounts.
    pub fn apply_config(&mut self, config: &ProductionConfig) {
        if let (ContainerKind::Breeder, Some(fuel)) = (self.kind, self.fuel.as_mut()) {
            fuel.amount = config.breeder_seed_cost;
        }
    }
}
