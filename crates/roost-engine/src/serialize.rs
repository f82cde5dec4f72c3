//! Binary snapshots of an engine via `bitcode`, behind a versioned header.
//!
//! Configuration and registry are not part of a snapshot: they belong to
//! the host and are supplied again on load. Every machine is rebuilt from
//! its blueprint under the current configuration and then restored, so a
//! shrunk capacity clamps the saved amounts instead of failing the load.

use roost_core::error::StateError;
use roost_core::rng::SimRng;
use serde::{Deserialize, Serialize};

use crate::grid::BlockPos;
use crate::machine::{Blueprint, Machine, MachineRecord};
use crate::Engine;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a Roost engine snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5255_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Fatal load failures. Out-of-range values inside a valid snapshot are not
/// errors; they come back as [`StateError`]s.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("two machines saved at {0:?}")]
    DuplicatePosition(BlockPos),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Prepended to every snapshot so the format can be checked before the
/// payload is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Engine tick at the time of the save.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot payload
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SavedMachine {
    pos: BlockPos,
    blueprint: Blueprint,
    record: MachineRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct EngineSnapshot {
    header: SnapshotHeader,
    rng_state: u64,
    paused: bool,
    /// In tick order.
    machines: Vec<SavedMachine>,
}

/// Read the header of a snapshot without building an engine.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: EngineSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

impl Engine {
    /// Serialize every machine's state.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let machines = self
            .order
            .iter()
            .filter_map(|&id| {
                let pos = *self.positions.get(id)?;
                let machine = self.machines.get(id)?;
                Some(SavedMachine {
                    pos,
                    blueprint: machine.blueprint(),
                    record: machine.record(),
                })
            })
            .collect();
        let snapshot = EngineSnapshot {
            header: SnapshotHeader::new(self.tick),
            rng_state: self.rng.state(),
            paused: self.paused,
            machines,
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Load a snapshot into a fresh engine built on `config` and `registry`.
    ///
    /// Returns the engine together with every value that had to be clamped
    /// to fit the current configuration. Machine ids are not stable across
    /// a save/load; look machines up by position.
    pub fn deserialize(
        data: &[u8],
        config: roost_core::config::RoostConfig,
        registry: roost_core::registry::Registry,
    ) -> Result<(Self, Vec<StateError>), DeserializeError> {
        let snapshot: EngineSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let mut engine = Engine::new(config, registry);
        engine.tick = snapshot.header.tick;
        engine.paused = snapshot.paused;
        let mut clamped = Vec::new();
        for saved in snapshot.machines {
            let mut machine = Machine::build(&saved.blueprint, &engine.config, 0);
            clamped.extend(machine.restore(&saved.record));
            engine
                .insert(saved.pos, machine)
                .map_err(|_| DeserializeError::DuplicatePosition(saved.pos))?;
        }
        engine.rng = SimRng::new(snapshot.rng_state);
        Ok((engine, clamped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(5).validate().is_ok());
        let bad = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(bad.validate(), Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))));
        let future = SnapshotHeader {
            version: FORMAT_VERSION + 1,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(future.validate(), Err(DeserializeError::FutureVersion(_))));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(read_snapshot_header(&[1, 2, 3]), Err(DeserializeError::Decode(_))));
    }
}
