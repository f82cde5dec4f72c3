//! Dousing plans: what one operation consumes and yields.

use roost_core::event::PlanMode;
use roost_core::id::{ItemTypeId, ResourceKind};
use serde::{Deserialize, Serialize};

/// Ticks of sufficient resources needed to complete one operation.
pub const PROGRESS_TARGET: u32 = 200;

/// Progress lost per starved tick.
pub const PROGRESS_DECAY: u32 = 2;

/// The candidate a plan was drawn from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanSource {
    SpecialA,
    SpecialB,
    CustomChemical,
    DefaultChemical,
    CustomFluid,
    DefaultFluid,
}

impl PlanSource {
    pub fn mode(self) -> PlanMode {
        match self {
            PlanSource::SpecialA | PlanSource::SpecialB => PlanMode::Special,
            PlanSource::CustomChemical | PlanSource::DefaultChemical => PlanMode::ResourceA,
            PlanSource::CustomFluid | PlanSource::DefaultFluid => PlanMode::ResourceB,
        }
    }

    /// The buffer this plan draws its resource cost from.
    pub fn resource_kind(self) -> ResourceKind {
        match self.mode() {
            PlanMode::ResourceA => ResourceKind::Chemical,
            PlanMode::ResourceB => ResourceKind::Fluid,
            PlanMode::Special | PlanMode::None => ResourceKind::Special,
        }
    }
}

/// One operation the planner could run right now. Recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPlan {
    pub mode: PlanMode,
    pub output: ItemTypeId,
    pub resource_cost: u32,
    pub energy_cost: u32,
    pub source: PlanSource,
}

impl OperationPlan {
    pub fn new(
        source: PlanSource,
        output: ItemTypeId,
        resource_cost: u32,
        energy_cost: u32,
    ) -> Self {
        Self {
            mode: source.mode(),
            output,
            resource_cost,
            energy_cost,
            source,
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.source.resource_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_follow_source() {
        assert_eq!(PlanSource::SpecialB.mode(), PlanMode::Special);
        assert_eq!(PlanSource::DefaultChemical.mode(), PlanMode::ResourceA);
        assert_eq!(PlanSource::CustomFluid.resource_kind(), ResourceKind::Fluid);
        let plan = OperationPlan::new(PlanSource::CustomChemical, ItemTypeId(4), 500, 2000);
        assert_eq!(plan.mode, PlanMode::ResourceA);
        assert_eq!(plan.resource_kind(), ResourceKind::Chemical);
    }

    #[test]
    fn sources_are_ordered_by_priority() {
        assert!(PlanSource::SpecialA < PlanSource::SpecialB);
        assert!(PlanSource::DefaultChemical < PlanSource::CustomFluid);
    }
}
