//! Events emitted by machines during their tick.
//!
//! Machines return the events of one tick as a `Vec`; the engine tags them
//! with the machine id and tick number. State-flag events fire only on
//! transitions, never every tick.

use crate::buffer::ResourceStack;
use crate::error::TransferError;
use crate::id::{Direction, ItemTypeId, ResourceKind};
use crate::item::Batch;

/// Which candidate a dousing plan was drawn from. Mirrors the planner's
/// priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PlanMode {
    #[default]
    None,
    /// Chemical-buffer conversion.
    ResourceA,
    /// Fluid-buffer conversion.
    ResourceB,
    /// Special infusion.
    Special,
}

/// Something observable that happened inside one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineEvent {
    // -- Converters --
    /// An input batch was cracked into the machine's buffer.
    Cracked { item: ItemTypeId, output: ResourceStack },
    /// Buffered resource was pushed to a neighbor.
    Exported {
        direction: Direction,
        kind: ResourceKind,
        output: ResourceStack,
    },
    /// The activity flag flipped.
    ActivityChanged { active: bool },

    // -- Timed production --
    CycleCompleted { produced: Vec<Batch> },
    /// A running cycle lost all of its sources and its timer was reset.
    CycleAborted,
    /// Output that did not fit anywhere and is handed to the host to drop
    /// into the world.
    OutputDropped { batch: Batch },

    // -- Dousing --
    PlanChanged { mode: PlanMode },
    OperationCompleted { output: Batch },
    OperationAborted { reason: TransferError },
    SpecialCharged { kind: ResourceKind, amount: u32 },
}

/// Discriminant tag for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineEventKind {
    Cracked,
    Exported,
    ActivityChanged,
    CycleCompleted,
    CycleAborted,
    OutputDropped,
    PlanChanged,
    OperationCompleted,
    OperationAborted,
    SpecialCharged,
}

impl MachineEvent {
    pub fn kind(&self) -> MachineEventKind {
        match self {
            MachineEvent::Cracked { .. } => MachineEventKind::Cracked,
            MachineEvent::Exported { .. } => MachineEventKind::Exported,
            MachineEvent::ActivityChanged { .. } => MachineEventKind::ActivityChanged,
            MachineEvent::CycleCompleted { .. } => MachineEventKind::CycleCompleted,
            MachineEvent::CycleAborted => MachineEventKind::CycleAborted,
            MachineEvent::OutputDropped { .. } => MachineEventKind::OutputDropped,
            MachineEvent::PlanChanged { .. } => MachineEventKind::PlanChanged,
            MachineEvent::OperationCompleted { .. } => MachineEventKind::OperationCompleted,
            MachineEvent::OperationAborted { .. } => MachineEventKind::OperationAborted,
            MachineEvent::SpecialCharged { .. } => MachineEventKind::SpecialCharged,
        }
    }
}
