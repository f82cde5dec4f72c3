use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a placed machine in the engine grid.
    pub struct MachineId;
}

/// Identifies an item type (sources, eggs, seeds, special items). Cheap to
/// copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(pub u32);

/// Identifies a bufferable resource (a fluid, a chemical, a special essence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceTypeId(pub u32);

impl ResourceTypeId {
    /// Tag carried by every energy buffer. Energy is fungible, so there is
    /// only one.
    pub const ENERGY: ResourceTypeId = ResourceTypeId(u32::MAX);
}

/// The family a buffer belongs to. Neighbors are looked up per kind, so a
/// fluid converter never pushes into an energy buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Energy,
    Fluid,
    Chemical,
    Special,
}

/// One of the six faces of a machine, in the fixed order used for pushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Enumeration order for neighbor visits. Pushes always walk this order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit offset `(dx, dy, dz)` of this face.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Position in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_id_equality() {
        let a = ItemTypeId(0);
        let b = ItemTypeId(0);
        let c = ItemTypeId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ResourceTypeId(0), "water");
        map.insert(ResourceTypeId(1), "lava");
        assert_eq!(map[&ResourceTypeId(1)], "lava");
    }

    #[test]
    fn direction_order_is_fixed() {
        let order: Vec<usize> = Direction::ALL.iter().map(|d| d.index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(Direction::ALL[0], Direction::Down);
        assert_eq!(Direction::ALL[5], Direction::East);
    }

    #[test]
    fn opposite_offsets_cancel() {
        for dir in Direction::ALL {
            let (ax, ay, az) = dir.offset();
            let (bx, by, bz) = dir.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
        }
    }
}
