//! Cross-machine transfer: the [`ResourceHandler`] seam and the two-phase
//! push.
//!
//! A push never trusts a cached capacity. It simulates on the receiver,
//! simulates the drain on the sender, and then commits the smaller of the
//! two on both sides.

use crate::buffer::{Action, ResourceBuffer, ResourceStack};
use crate::id::{Direction, ResourceKind, ResourceTypeId};

/// Anything that exposes a buffer to its neighbors.
pub trait ResourceHandler {
    fn kind(&self) -> ResourceKind;

    fn stored(&self) -> Option<ResourceStack>;

    fn capacity(&self) -> u32;

    fn fill(&mut self, resource: ResourceTypeId, amount: u32, action: Action) -> u32;

    fn drain(&mut self, amount: u32, action: Action) -> u32;
}

impl ResourceHandler for ResourceBuffer {
    fn kind(&self) -> ResourceKind {
        ResourceBuffer::kind(self)
    }

    fn stored(&self) -> Option<ResourceStack> {
        ResourceBuffer::stored(self)
    }

    fn capacity(&self) -> u32 {
        ResourceBuffer::capacity(self)
    }

    fn fill(&mut self, resource: ResourceTypeId, amount: u32, action: Action) -> u32 {
        ResourceBuffer::fill(self, resource, amount, action)
    }

    fn drain(&mut self, amount: u32, action: Action) -> u32 {
        ResourceBuffer::drain(self, amount, action)
    }
}

impl<T: ResourceHandler + ?Sized> ResourceHandler for &mut T {
    fn kind(&self) -> ResourceKind {
        (**self).kind()
    }

    fn stored(&self) -> Option<ResourceStack> {
        (**self).stored()
    }

    fn capacity(&self) -> u32 {
        (**self).capacity()
    }

    fn fill(&mut self, resource: ResourceTypeId, amount: u32, action: Action) -> u32 {
        (**self).fill(resource, amount, action)
    }

    fn drain(&mut self, amount: u32, action: Action) -> u32 {
        (**self).drain(amount, action)
    }
}

/// A view of a buffer that neighbors may drain but never fill. Producers
/// expose their output this way so two converters cannot ping-pong.
#[derive(Debug)]
pub struct ExtractOnly<'a>(pub &'a mut ResourceBuffer);

impl ResourceHandler for ExtractOnly<'_> {
    fn kind(&self) -> ResourceKind {
        self.0.kind()
    }

    fn stored(&self) -> Option<ResourceStack> {
        self.0.stored()
    }

    fn capacity(&self) -> u32 {
        self.0.capacity()
    }

    fn fill(&mut self, _resource: ResourceTypeId, _amount: u32, _action: Action) -> u32 {
        0
    }

    fn drain(&mut self, amount: u32, action: Action) -> u32 {
        self.0.drain(amount, action)
    }
}

/// Lookup of the handlers adjacent to the machine being ticked.
pub trait Neighbors {
    /// The neighbor's handler for `kind` on the given face, if there is one.
    fn handler(
        &mut self,
        direction: Direction,
        kind: ResourceKind,
    ) -> Option<Box<dyn ResourceHandler + '_>>;
}

/// A machine with no neighbors.
#[derive(Debug, Default, Clone, Copy)]
pub struct Isolated;

impl Neighbors for Isolated {
    fn handler(
        &mut self,
        _direction: Direction,
        _kind: ResourceKind,
    ) -> Option<Box<dyn ResourceHandler + '_>> {
        None
    }
}

/// Move up to `max` from `source` to `sink` with simulate-then-commit on
/// both sides. Returns the amount moved.
pub fn transfer(source: &mut dyn ResourceHandler, sink: &mut dyn ResourceHandler, max: u32) -> u32 {
    let Some(stack) = source.stored() else {
        return 0;
    };
    let offered = max.min(stack.amount);
    if offered == 0 {
        return 0;
    }

    let accepted = sink.fill(stack.resource, offered, Action::Simulate);
    if accepted == 0 {
        return 0;
    }
    let moved = source.drain(accepted, Action::Simulate).min(accepted);
    if moved == 0 {
        return 0;
    }

    let filled = sink.fill(stack.resource, moved, Action::Commit);
    debug_assert_eq!(filled, moved, "sink committed a different amount than it simulated");
    let drained = source.drain(filled, Action::Commit);
    debug_assert_eq!(drained, filled, "source drained a different amount than it simulated");
    log::trace!("moved {filled} of {:?}", stack.resource);
    filled
}

/// One successful push toward a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    pub direction: Direction,
    pub resource: ResourceTypeId,
    pub amount: u32,
}

/// Offer `min(transfer_rate, amount)` to every neighbor of the buffer's kind
/// in [`Direction::ALL`] order, stopping once the buffer is empty.
pub fn push_to_neighbors(
    buffer: &mut ResourceBuffer,
    neighbors: &mut dyn Neighbors,
) -> Vec<Export> {
    let mut exports = Vec::new();
    let kind = buffer.kind();
    for direction in Direction::ALL {
        let Some(resource) = buffer.resource() else {
            break;
        };
        let Some(mut sink) = neighbors.handler(direction, kind) else {
            continue;
        };
        let rate = buffer.transfer_rate();
        let moved = transfer(&mut *buffer, sink.as_mut(), rate);
        if moved > 0 {
            exports.push(Export {
                direction,
                resource,
                amount: moved,
            });
        }
    }
    exports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::VecNeighbors;

    fn water() -> ResourceTypeId {
        ResourceTypeId(1)
    }

    fn full_tank(capacity: u32, rate: u32) -> ResourceBuffer {
        let mut buf = ResourceBuffer::new(ResourceKind::Fluid, capacity, rate);
        buf.fill(water(), capacity, Action::Commit);
        buf
    }

    #[test]
    fn transfer_is_limited_by_sink_space() {
        let mut source = full_tank(1000, 200);
        let mut sink = ResourceBuffer::new(ResourceKind::Fluid, 150, 0);
        assert_eq!(transfer(&mut source, &mut sink, 200), 150);
        assert_eq!(source.amount(), 850);
        assert_eq!(sink.amount(), 150);
    }

    #[test]
    fn transfer_is_limited_by_source_amount() {
        let mut source = ResourceBuffer::new(ResourceKind::Fluid, 1000, 200);
        source.fill(water(), 30, Action::Commit);
        let mut sink = ResourceBuffer::new(ResourceKind::Fluid, 1000, 0);
        assert_eq!(transfer(&mut source, &mut sink, 200), 30);
        assert!(source.is_empty());
        assert_eq!(source.resource(), None);
    }

    #[test]
    fn transfer_to_incompatible_sink_moves_nothing() {
        let mut source = full_tank(1000, 200);
        let mut sink = ResourceBuffer::new(ResourceKind::Fluid, 1000, 0);
        sink.fill(ResourceTypeId(9), 1, Action::Commit);
        assert_eq!(transfer(&mut source, &mut sink, 200), 0);
        assert_eq!(source.amount(), 1000);
    }

    #[test]
    fn extract_only_refuses_fills() {
        let mut source = full_tank(1000, 200);
        let mut target = ResourceBuffer::new(ResourceKind::Fluid, 1000, 0);
        let mut port = ExtractOnly(&mut target);
        assert_eq!(transfer(&mut source, &mut port, 200), 0);
    }

    #[test]
    fn push_visits_directions_in_order_and_stops_when_empty() {
        let mut source = ResourceBuffer::new(ResourceKind::Fluid, 1000, 200);
        source.fill(water(), 250, Action::Commit);

        let mut neighbors = VecNeighbors::default();
        neighbors.insert(Direction::East, ResourceBuffer::new(ResourceKind::Fluid, 1000, 0));
        neighbors.insert(Direction::Up, ResourceBuffer::new(ResourceKind::Fluid, 1000, 0));
        neighbors.insert(Direction::Down, ResourceBuffer::new(ResourceKind::Fluid, 1000, 0));

        let exports = push_to_neighbors(&mut source, &mut neighbors);
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].direction, Direction::Down);
        assert_eq!(exports[0].amount, 200);
        assert_eq!(exports[1].direction, Direction::Up);
        assert_eq!(exports[1].amount, 50);
        assert!(source.is_empty());
        assert_eq!(neighbors.get(Direction::East).unwrap().amount(), 0);
    }

    #[test]
    fn push_skips_neighbors_of_other_kinds() {
        let mut source = full_tank(1000, 200);
        let mut neighbors = VecNeighbors::default();
        neighbors.insert(Direction::Down, ResourceBuffer::new(ResourceKind::Energy, 1000, 0));
        assert!(push_to_neighbors(&mut source, &mut neighbors).is_empty());
        assert_eq!(source.amount(), 1000);
    }
}
