//! Per-slot production sources.
//!
//! A [`ProductionSource`] is derived from the batch sitting in a source slot
//! plus the registry's definition for that item. It is rebuilt from scratch
//! every tick and never edited in place.

use roost_core::id::ItemTypeId;
use roost_core::item::{Batch, SourceStats};
use roost_core::registry::Registry;
use roost_core::rng::SimRng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Yield stats
// ---------------------------------------------------------------------------

/// Output size bracket, from the source's gain stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GainTier {
    /// Gain below 5.
    Low,
    /// Gain 5 through 9.
    Mid,
    /// Gain 10.
    High,
}

impl GainTier {
    pub fn from_gain(gain: u8) -> Self {
        match gain {
            g if g >= SourceStats::MAX => GainTier::High,
            5..=9 => GainTier::Mid,
            _ => GainTier::Low,
        }
    }

    /// Units laid per completed cycle.
    pub fn yield_count(self) -> u32 {
        match self {
            GainTier::Low => 1,
            GainTier::Mid => 2,
            GainTier::High => 3,
        }
    }
}

/// The parts of a source that drive its timing and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YieldStats {
    pub gain_tier: GainTier,
    /// Elapsed ticks contributed per unit per tick.
    pub growth_rate: u32,
    /// Base lay time range `(min, max)` in ticks.
    pub lay_range: (u32, u32),
}

// ---------------------------------------------------------------------------
// Production source
// ---------------------------------------------------------------------------

/// One recognized source slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionSource {
    pub identity: ItemTypeId,
    pub stats: YieldStats,
    pub lay_item: ItemTypeId,
    /// Units in the slot.
    pub count: u32,
}

impl PartialEq for ProductionSource {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.stats == other.stats
    }
}

impl Eq for ProductionSource {}

impl ProductionSource {
    /// Derive a source from a slot batch. `None` when the item is not a
    /// registered source.
    pub fn from_batch(batch: &Batch, registry: &Registry) -> Option<Self> {
        let def = registry.source(batch.item)?;
        let stats = batch.stats.unwrap_or_default();
        Some(Self {
            identity: batch.item,
            stats: YieldStats {
                gain_tier: GainTier::from_gain(stats.gain),
                growth_rate: stats.growth as u32,
                lay_range: (def.lay_min, def.lay_max),
            },
            lay_item: def.lay_item,
            count: batch.count,
        })
    }

    /// `count * growth_rate`.
    pub fn contribution(&self) -> u32 {
        self.count.saturating_mul(self.stats.growth_rate)
    }

    /// One draw from the lay time range, unscaled.
    pub fn sample_lay_time(&self, rng: &mut SimRng) -> u32 {
        let (min, max) = self.stats.lay_range;
        rng.range_inclusive(min, max)
    }

    /// What one completed cycle yields for this source.
    pub fn output(&self) -> Batch {
        Batch::new(self.lay_item, self.stats.gain_tier.yield_count())
    }
}
