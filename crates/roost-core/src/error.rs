//! Error taxonomy shared by every machine.
//!
//! None of these are fatal. Machines turn them into a rejected transfer, an
//! aborted completion, or a silently clamped value, and report them through
//! events and the `log` facade.

use crate::id::{ResourceKind, ResourceTypeId};

/// Why a buffer operation could not happen as requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The buffer already holds a different resource.
    #[error("buffer holds {held:?}, cannot accept {offered:?}")]
    IncompatibleType {
        held: ResourceTypeId,
        offered: ResourceTypeId,
    },
    /// More was requested than the simulate step reported.
    #[error("requested {requested} but only {available} fits")]
    CapacityExceeded { requested: u32, available: u32 },
    /// A required buffer was below cost at commit time.
    #[error("needed {required} {kind:?} but only {available} is stored")]
    StarvedResource {
        kind: ResourceKind,
        required: u32,
        available: u32,
    },
}

/// Problems found while restoring persisted state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("persisted {field} was {value}, clamped to {clamped}")]
    MalformedPersistedState {
        field: &'static str,
        value: u64,
        clamped: u64,
    },
}

impl StateError {
    /// Log the clamp. Restores never fail on malformed values.
    pub fn report(&self) {
        log::warn!("{self}");
    }
}
