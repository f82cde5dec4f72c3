//! Read-only configuration supplied by the host.
//!
//! Every field has a default so a partial data file is valid. Values may
//! change between loads; machines re-clamp their state in `apply_config`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::id::ItemTypeId;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoostConfig {
    pub production: ProductionConfig,
    pub converters: ConverterConfig,
    pub dousing: DousingConfig,
}

/// Timed production containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Divides roost lay times. 2.0 lays twice as fast.
    pub roost_speed_multiplier: f64,
    /// Divides breeder lay times.
    pub breeder_speed_multiplier: f64,
    /// Seeds consumed per completed breeding cycle.
    pub breeder_seed_cost: u32,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            roost_speed_multiplier: 1.0,
            breeder_speed_multiplier: 1.0,
            breeder_seed_cost: 2,
        }
    }
}

impl ProductionConfig {
    pub fn roost_speed(&self) -> Fixed64 {
        speed_multiplier("roost_speed_multiplier", self.roost_speed_multiplier)
    }

    pub fn breeder_speed(&self) -> Fixed64 {
        speed_multiplier("breeder_speed_multiplier", self.breeder_speed_multiplier)
    }
}

/// NaN, infinite and non-positive multipliers fall back to 1. Finite values
/// too large for [`Fixed64`] saturate.
fn speed_multiplier(field: &'static str, value: f64) -> Fixed64 {
    if !value.is_finite() || value <= 0.0 {
        log::warn!("{field} = {value} is not a positive number, using 1.0");
        return Fixed64::ONE;
    }
    f64_to_fixed64(value)
}

/// Size and throughput of one converter buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpec {
    pub capacity: u32,
    pub transfer_rate: u32,
}

/// Power, fluid and chemical converters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// When false the activity flag stays off regardless of work done.
    pub show_activity: bool,
    pub power: BufferSpec,
    pub fluid: BufferSpec,
    pub chemical: BufferSpec,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            show_activity: true,
            power: BufferSpec {
                capacity: 100_000,
                transfer_rate: 1_000,
            },
            fluid: BufferSpec {
                capacity: 8_000,
                transfer_rate: 1_000,
            },
            chemical: BufferSpec {
                capacity: 8_000,
                transfer_rate: 1_000,
            },
        }
    }
}

/// The dousing machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DousingConfig {
    pub energy_capacity: u32,
    pub fluid_capacity: u32,
    pub chemical_capacity: u32,
    /// The special buffer must be exactly full for an infusion.
    pub special_capacity: u32,
    /// Added per special item used on the machine.
    pub special_increment: u32,
    /// Energy per fluid or chemical conversion.
    pub energy_cost: u32,
    /// Energy per special infusion.
    pub special_energy_cost: u32,
    /// Chemical consumed per default chemical conversion.
    pub chemical_cost: u32,
    /// Fluid consumed per default fluid conversion when the output has no
    /// entry in `liquid_costs`.
    pub default_liquid_cost: u32,
    /// Per-output fluid cost overrides.
    pub liquid_costs: BTreeMap<ItemTypeId, u32>,
}

impl Default for DousingConfig {
    fn default() -> Self {
        Self {
            energy_capacity: 100_000,
            fluid_capacity: 10_000,
            chemical_capacity: 10_000,
            special_capacity: 1_000,
            special_increment: 100,
            energy_cost: 10_000,
            special_energy_cost: 10_000,
            chemical_cost: 1_000,
            default_liquid_cost: 1_000,
            liquid_costs: BTreeMap::new(),
        }
    }
}

impl DousingConfig {
    /// Fluid cost of dousing into `output`.
    pub fn liquid_dousing_cost(&self, output: ItemTypeId) -> u32 {
        self.liquid_costs
            .get(&output)
            .copied()
            .unwrap_or(self.default_liquid_cost)
    }
}
