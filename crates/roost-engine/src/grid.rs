//! Block positions and the neighbor view the engine hands to a ticking
//! machine.

use std::collections::HashMap;

use roost_core::id::{Direction, MachineId, ResourceKind};
use roost_core::transfer::{Neighbors, ResourceHandler};
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::machine::Machine;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent position across `direction`.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }
}

/// Neighbors of the machine at `origin`. The ticking machine itself is
/// detached from `machines` while this view exists.
pub(crate) struct WorldNeighbors<'a> {
    pub origin: BlockPos,
    pub by_pos: &'a HashMap<BlockPos, MachineId>,
    pub machines: &'a mut SecondaryMap<MachineId, Machine>,
}

impl Neighbors for WorldNeighbors<'_> {
    fn handler(
        &mut self,
        direction: Direction,
        kind: ResourceKind,
    ) -> Option<Box<dyn ResourceHandler + '_>> {
        let id = *self.by_pos.get(&self.origin.offset(direction))?;
        self.machines.get_mut(id)?.port(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_follows_direction() {
        let p = BlockPos::new(0, 64, 0);
        assert_eq!(p.offset(Direction::Up), BlockPos::new(0, 65, 0));
        assert_eq!(p.offset(Direction::West), BlockPos::new(-1, 64, 0));
        assert_eq!(p.offset(Direction::North).offset(Direction::South), p);
    }
}
