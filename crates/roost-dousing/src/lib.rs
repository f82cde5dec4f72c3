//! The dousing machine for the Roost engine.
//!
//! A [`DousingPlanner`] holds four buffers (energy, fluid, chemical,
//! special), one bulk input slot and one bulk output slot. Every tick it
//! picks the highest-priority plan the slots allow, then advances or
//! decays its progress depending on whether the buffers can pay for it.
//!
//! # Priority
//!
//! 1. Special infusion A.
//! 2. Special infusion B.
//! 3. Custom chemical recipe for the buffered chemical.
//! 4. Default chemical conversion.
//! 5. Custom fluid recipe, then default fluid conversion.
//!
//! # Progress
//!
//! `+1` per tick with sufficient resources, `-2` (floored at 0) per starved
//! tick. At [`PROGRESS_TARGET`] the operation commits: energy and resource
//! are drained together or not at all.

pub mod plan;
pub mod port;

use roost_core::buffer::{Action, ResourceBuffer};
use roost_core::config::DousingConfig;
use roost_core::error::{StateError, TransferError};
use roost_core::event::{MachineEvent, PlanMode};
use roost_core::id::{ItemTypeId, ResourceKind};
use roost_core::item::{Batch, Slot, SlotRole};
use roost_core::persist::{BufferRecord, PlanRecord, clamp_field};
use roost_core::registry::{InfusionSlot, Registry};
use roost_core::signal;
use roost_core::transfer::ResourceHandler;
use serde::{Deserialize, Serialize};

pub use plan::{OperationPlan, PROGRESS_DECAY, PROGRESS_TARGET, PlanSource};
pub use port::FluidPort;

pub const INPUT_SLOT: usize = 0;
pub const OUTPUT_SLOT: usize = 1;

/// Saved dousing state. The plan itself is recomputed on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DousingRecord {
    pub energy: BufferRecord,
    pub fluid: BufferRecord,
    pub chemical: BufferRecord,
    pub special: BufferRecord,
    pub input: Option<Batch>,
    pub output: Option<Batch>,
    pub plan: PlanRecord,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DousingPlanner {
    energy: ResourceBuffer,
    fluid: ResourceBuffer,
    chemical: ResourceBuffer,
    special: ResourceBuffer,
    input: Slot,
    output: Slot,
    progress: u32,
    mode: PlanMode,
    config: DousingConfig,
    /// Events raised outside a tick (special charging), flushed by the next
    /// tick.
    pending: Vec<MachineEvent>,
}

impl DousingPlanner {
    pub fn new(config: &DousingConfig) -> Self {
        Self {
            energy: ResourceBuffer::new(ResourceKind::Energy, config.energy_capacity, 0),
            fluid: ResourceBuffer::new(ResourceKind::Fluid, config.fluid_capacity, 0),
            chemical: ResourceBuffer::new(ResourceKind::Chemical, config.chemical_capacity, 0),
            special: ResourceBuffer::new(ResourceKind::Special, config.special_capacity, 0),
            input: Slot::new(SlotRole::Bulk),
            output: Slot::new(SlotRole::Bulk),
            progress: 0,
            mode: PlanMode::None,
            config: config.clone(),
            pending: Vec::new(),
        }
    }

    pub fn buffer(&self, kind: ResourceKind) -> &ResourceBuffer {
        match kind {
            ResourceKind::Energy => &self.energy,
            ResourceKind::Fluid => &self.fluid,
            ResourceKind::Chemical => &self.chemical,
            ResourceKind::Special => &self.special,
        }
    }

    fn buffer_mut(&mut self, kind: ResourceKind) -> &mut ResourceBuffer {
        match kind {
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Fluid => &mut self.fluid,
            ResourceKind::Chemical => &mut self.chemical,
            ResourceKind::Special => &mut self.special,
        }
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Mode of the plan chosen on the last tick.
    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    pub fn analog_signal(&self) -> u8 {
        signal::analog_signal(self.progress as u64, PROGRESS_TARGET as u64)
    }

    pub fn config(&self) -> &DousingConfig {
        &self.config
    }

    /// Pick up a reloaded configuration and re-clamp every buffer.
    pub fn apply_config(&mut self, config: &DousingConfig) {
        let sizes = [
            (ResourceKind::Energy, config.energy_capacity),
            (ResourceKind::Fluid, config.fluid_capacity),
            (ResourceKind::Chemical, config.chemical_capacity),
            (ResourceKind::Special, config.special_capacity),
        ];
        for (kind, capacity) in sizes {
            if let Some(err) = self.buffer_mut(kind).set_capacity(capacity) {
                err.report();
            }
        }
        self.config = config.clone();
    }

    // -- Ports --

    /// The handler a neighbor sees for `kind`. The special buffer is only
    /// charged through [`charge_special`](Self::charge_special).
    pub fn port(&mut self, kind: ResourceKind) -> Option<Box<dyn ResourceHandler + '_>> {
        match kind {
            ResourceKind::Energy => Some(Box::new(&mut self.energy)),
            ResourceKind::Fluid => Some(Box::new(FluidPort {
                fluid: &mut self.fluid,
                special: &self.special,
            })),
            #[cfg(feature = "chemical")]
            ResourceKind::Chemical => Some(Box::new(&mut self.chemical)),
            _ => None,
        }
    }

    // -- Slot operations --

    fn slot(&self, slot: usize) -> Option<&Slot> {
        match slot {
            INPUT_SLOT => Some(&self.input),
            OUTPUT_SLOT => Some(&self.output),
            _ => None,
        }
    }

    fn slot_mut(&mut self, slot: usize) -> Option<&mut Slot> {
        match slot {
            INPUT_SLOT => Some(&mut self.input),
            OUTPUT_SLOT => Some(&mut self.output),
            _ => None,
        }
    }

    pub fn get_batch(&self, slot: usize) -> Option<&Batch> {
        self.slot(slot).and_then(Slot::batch)
    }

    #[must_use = "the returned batch was rejected by the slot"]
    pub fn set_batch(&mut self, slot: usize, batch: Option<Batch>) -> Option<Batch> {
        match self.slot_mut(slot) {
            Some(s) => s.set(batch),
            None => batch,
        }
    }

    pub fn remove_batch(&mut self, slot: usize, count: u32) -> Option<Batch> {
        self.slot_mut(slot)?.remove(count)
    }

    // -- Special charging --

    /// Use `item` on the machine. Adds `special_increment` of the item's
    /// special resource, capped at capacity. Returns the amount added.
    ///
    /// Rejected while the fluid buffer holds anything, while the special
    /// buffer holds a different resource, or when it is already full.
    /// Items that are not special charge nothing.
    pub fn charge_special(
        &mut self,
        item: ItemTypeId,
        registry: &Registry,
    ) -> Result<u32, TransferError> {
        let Some(resource) = registry.special_resource(item) else {
            return Ok(0);
        };
        if let Some(held) = self.fluid.resource() {
            return Err(TransferError::IncompatibleType {
                held,
                offered: resource,
            });
        }
        let available = self.special.check_fill(resource, self.config.special_increment)?;
        if available == 0 {
            return Err(TransferError::CapacityExceeded {
                requested: self.config.special_increment,
                available,
            });
        }
        let added = self.special.fill(resource, available, Action::Commit);
        self.pending.push(MachineEvent::SpecialCharged {
            kind: ResourceKind::Special,
            amount: added,
        });
        Ok(added)
    }

    // -- Planning --

    /// Whether an operation yielding `output` would fit the output slot.
    fn output_fits(&self, output: ItemTypeId) -> bool {
        self.output.space_for(&Batch::new(output, 1)) > 0
    }

    /// The highest-priority plan the current slots and buffer types allow.
    /// Resource amounts are not considered here.
    pub fn choose_plan(&self, registry: &mut Registry) -> Option<OperationPlan> {
        let input = self.input.batch()?.item;
        let candidates = [
            self.special_candidate(InfusionSlot::A, PlanSource::SpecialA, input, registry),
            self.special_candidate(InfusionSlot::B, PlanSource::SpecialB, input, registry),
            self.custom_candidate(ResourceKind::Chemical, input, registry),
            self.default_chemical_candidate(input, registry),
            self.custom_candidate(ResourceKind::Fluid, input, registry),
            self.default_fluid_candidate(input, registry),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|plan| self.output_fits(plan.output))
    }

    fn special_candidate(
        &self,
        slot: InfusionSlot,
        source: PlanSource,
        input: ItemTypeId,
        registry: &Registry,
    ) -> Option<OperationPlan> {
        let infusion = registry.infusion(slot)?;
        let charged = self.special.resource() == Some(infusion.resource) && self.special.is_full();
        (infusion.input == input && charged).then(|| {
            OperationPlan::new(
                source,
                infusion.output,
                self.special.capacity(),
                self.config.special_energy_cost,
            )
        })
    }

    fn custom_candidate(
        &self,
        kind: ResourceKind,
        input: ItemTypeId,
        registry: &Registry,
    ) -> Option<OperationPlan> {
        let resource = self.buffer(kind).resource()?;
        let recipe = registry.find_dousing_override(kind, resource, input)?;
        let source = match kind {
            ResourceKind::Chemical => PlanSource::CustomChemical,
            _ => PlanSource::CustomFluid,
        };
        Some(OperationPlan::new(
            source,
            recipe.output,
            recipe.resource_cost,
            recipe.energy_cost,
        ))
    }

    fn default_chemical_candidate(
        &self,
        input: ItemTypeId,
        registry: &mut Registry,
    ) -> Option<OperationPlan> {
        if registry.dousing_input() != Some(input) {
            return None;
        }
        let resource = self.chemical.resource()?;
        let output = registry.resolve_source_for(ResourceKind::Chemical, resource)?;
        Some(OperationPlan::new(
            PlanSource::DefaultChemical,
            output,
            self.config.chemical_cost,
            self.config.energy_cost,
        ))
    }

    fn default_fluid_candidate(
        &self,
        input: ItemTypeId,
        registry: &mut Registry,
    ) -> Option<OperationPlan> {
        if registry.dousing_input() != Some(input) {
            return None;
        }
        let resource = self.fluid.resource()?;
        let output = registry.resolve_source_for(ResourceKind::Fluid, resource)?;
        Some(OperationPlan::new(
            PlanSource::DefaultFluid,
            output,
            self.config.liquid_dousing_cost(output),
            self.config.energy_cost,
        ))
    }

    /// Energy and the plan's resource buffer both cover their costs.
    pub fn has_resources_for(&self, plan: &OperationPlan) -> bool {
        self.energy.amount() >= plan.energy_cost
            && self.buffer(plan.resource_kind()).amount() >= plan.resource_cost
    }

    // -- Tick --

    pub fn tick(&mut self, registry: &mut Registry) -> Vec<MachineEvent> {
        let mut events = std::mem::take(&mut self.pending);

        let plan = self.choose_plan(registry);
        let mode = plan.map_or(PlanMode::None, |p| p.mode);
        if mode != self.mode {
            log::debug!("dousing plan {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            events.push(MachineEvent::PlanChanged { mode });
        }

        match plan {
            Some(plan) if self.has_resources_for(&plan) => {
                self.progress += 1;
                if self.progress >= PROGRESS_TARGET {
                    match self.commit(&plan) {
                        Ok(output) => events.push(MachineEvent::OperationCompleted { output }),
                        Err(reason) => {
                            log::warn!("dousing operation aborted: {reason}");
                            events.push(MachineEvent::OperationAborted { reason });
                        }
                    }
                }
            }
            _ => self.progress = self.progress.saturating_sub(PROGRESS_DECAY),
        }
        events
    }

    /// Run one operation: drain energy and resource together, stack the
    /// output and consume one input. Progress is reset either way.
    ///
    /// Fails without consuming anything when a buffer is short
    /// ([`TransferError::StarvedResource`], energy checked first) or when
    /// the slots no longer fit the plan ([`TransferError::CapacityExceeded`]).
    pub fn commit(&mut self, plan: &OperationPlan) -> Result<Batch, TransferError> {
        self.progress = 0;

        let kind = plan.resource_kind();
        if self.energy.drain(plan.energy_cost, Action::Simulate) < plan.energy_cost {
            return Err(TransferError::StarvedResource {
                kind: ResourceKind::Energy,
                required: plan.energy_cost,
                available: self.energy.amount(),
            });
        }
        let available = self.buffer_mut(kind).drain(plan.resource_cost, Action::Simulate);
        if available < plan.resource_cost {
            return Err(TransferError::StarvedResource {
                kind,
                required: plan.resource_cost,
                available,
            });
        }
        let space = self.output.space_for(&Batch::new(plan.output, 1));
        if space == 0 || self.input.is_empty() {
            return Err(TransferError::CapacityExceeded {
                requested: 1,
                available: space,
            });
        }

        self.energy.drain_exact(plan.energy_cost)?;
        self.buffer_mut(kind).drain_exact(plan.resource_cost)?;
        let output = Batch::new(plan.output, 1);
        if let Some(rejected) = self.output.insert(output.clone()) {
            log::warn!("dousing output overflowed by {}", rejected.count);
        }
        self.input.remove(1);
        Ok(output)
    }

    // -- Persistence --

    pub fn record(&self) -> DousingRecord {
        DousingRecord {
            energy: BufferRecord::from(&self.energy),
            fluid: BufferRecord::from(&self.fluid),
            chemical: BufferRecord::from(&self.chemical),
            special: BufferRecord::from(&self.special),
            input: self.input.batch().cloned(),
            output: self.output.batch().cloned(),
            plan: PlanRecord {
                mode: self.mode,
                progress: self.progress,
            },
        }
    }

    pub fn restore(&mut self, record: &DousingRecord) -> Vec<StateError> {
        let mut errors = Vec::new();
        errors.extend(record.energy.restore_into(&mut self.energy));
        errors.extend(record.fluid.restore_into(&mut self.fluid));
        errors.extend(record.chemical.restore_into(&mut self.chemical));
        errors.extend(record.special.restore_into(&mut self.special));
        for (slot, batch) in [(INPUT_SLOT, &record.input), (OUTPUT_SLOT, &record.output)] {
            if let Some(rejected) = self.set_batch(slot, batch.clone()) {
                errors.push(StateError::MalformedPersistedState {
                    field: "dousing slot count",
                    value: rejected.count as u64 + SlotRole::Bulk.max_stack() as u64,
                    clamped: SlotRole::Bulk.max_stack() as u64,
                });
            }
        }
        let (progress, err) =
            clamp_field("dousing progress", record.plan.progress, PROGRESS_TARGET);
        errors.extend(err);
        self.progress = progress;
        self.mode = record.plan.mode;
        for e in &errors {
            e.report();
        }
        errors
    }
}
