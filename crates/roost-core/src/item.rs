use crate::id::ItemTypeId;
use serde::{Deserialize, Serialize};

/// Breeding stats carried by a source batch. Each stat is 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceStats {
    pub gain: u8,
    pub growth: u8,
    pub strength: u8,
}

impl SourceStats {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(gain: u8, growth: u8, strength: u8) -> Self {
        Self {
            gain: gain.clamp(Self::MIN, Self::MAX),
            growth: growth.clamp(Self::MIN, Self::MAX),
            strength: strength.clamp(Self::MIN, Self::MAX),
        }
    }
}

impl Default for SourceStats {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// A countable group of identical units occupying one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub item: ItemTypeId,
    pub count: u32,
    /// Present on source batches only. Two batches with different stats
    /// never stack.
    #[serde(default)]
    pub stats: Option<SourceStats>,
}

impl Batch {
    pub fn new(item: ItemTypeId, count: u32) -> Self {
        Self {
            item,
            count,
            stats: None,
        }
    }

    pub fn with_stats(item: ItemTypeId, count: u32, stats: SourceStats) -> Self {
        Self {
            item,
            count,
            stats: Some(stats),
        }
    }

    /// Whether `other` could merge into this batch.
    pub fn stacks_with(&self, other: &Batch) -> bool {
        self.item == other.item && self.stats == other.stats
    }

    /// Split off up to `count` units, leaving the remainder here.
    pub fn split(&mut self, count: u32) -> Batch {
        let taken = count.min(self.count);
        self.count -= taken;
        Batch {
            item: self.item,
            count: taken,
            stats: self.stats,
        }
    }
}

/// What a slot is for; decides its maximum batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotRole {
    /// A single unique unit (one breeding source, one egg to crack).
    Unique,
    /// Stackable bulk goods.
    Bulk,
}

impl SlotRole {
    pub fn max_stack(self) -> u32 {
        match self {
            SlotRole::Unique => 1,
            SlotRole::Bulk => 64,
        }
    }
}

/// One slot holding at most one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub role: SlotRole,
    batch: Option<Batch>,
}

impl Slot {
    pub fn new(role: SlotRole) -> Self {
        Self { role, batch: None }
    }

    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_none()
    }

    pub fn count(&self) -> u32 {
        self.batch.as_ref().map(|b| b.count).unwrap_or(0)
    }

    /// Whether one more unit of anything fits.
    pub fn has_space(&self) -> bool {
        self.count() < self.role.max_stack()
    }

    /// How many units of `batch` this slot could take.
    pub fn space_for(&self, batch: &Batch) -> u32 {
        match &self.batch {
            None => self.role.max_stack(),
            Some(held) if held.stacks_with(batch) => {
                self.role.max_stack().saturating_sub(held.count)
            }
            Some(_) => 0,
        }
    }

    /// Replace the contents. Anything above the role's maximum is handed
    /// back.
    #[must_use = "the returned batch did not fit in the slot"]
    pub fn set(&mut self, batch: Option<Batch>) -> Option<Batch> {
        match batch {
            Some(mut b) if b.count > 0 => {
                let excess = b.count.saturating_sub(self.role.max_stack());
                let overflow = (excess > 0).then(|| b.split(excess));
                self.batch = Some(b);
                overflow
            }
            _ => {
                self.batch = None;
                None
            }
        }
    }

    /// Merge `batch` into this slot. Returns whatever did not fit.
    #[must_use = "the returned batch did not fit in the slot"]
    pub fn insert(&mut self, mut batch: Batch) -> Option<Batch> {
        let fits = self.space_for(&batch).min(batch.count);
        if fits > 0 {
            let moved = batch.split(fits);
            match &mut self.batch {
                Some(held) => held.count += moved.count,
                None => self.batch = Some(moved),
            }
        }
        (batch.count > 0).then_some(batch)
    }

    /// Remove up to `count` units. Returns what was actually removed.
    pub fn remove(&mut self, count: u32) -> Option<Batch> {
        let held = self.batch.as_mut()?;
        let removed = held.split(count);
        if held.count == 0 {
            self.batch = None;
        }
        (removed.count > 0).then_some(removed)
    }

    pub fn take(&mut self) -> Option<Batch> {
        self.batch.take()
    }
}

/// A machine's slots, addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventory {
    pub slots: Vec<Slot>,
}

impl SlotInventory {
    pub fn new(roles: &[SlotRole]) -> Self {
        Self {
            slots: roles.iter().map(|r| Slot::new(*r)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get_batch(&self, slot: usize) -> Option<&Batch> {
        self.slots.get(slot).and_then(Slot::batch)
    }

    /// Replace a slot's batch. Returns the part that was rejected (all of it
    /// for an unknown slot index).
    #[must_use = "the returned batch was rejected by the slot"]
    pub fn set_batch(&mut self, slot: usize, batch: Option<Batch>) -> Option<Batch> {
        match self.slots.get_mut(slot) {
            Some(s) => s.set(batch),
            None => batch,
        }
    }

    pub fn remove_batch(&mut self, slot: usize, count: u32) -> Option<Batch> {
        self.slots.get_mut(slot)?.remove(count)
    }

    pub fn slot(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut Slot> {
        self.slots.get_mut(slot)
    }

    /// Insert across `range`: first onto matching batches, then into empty
    /// slots. Returns the overflow.
    #[must_use = "overflow indicates units that did not fit"]
    pub fn insert_into(&mut self, range: std::ops::Range<usize>, batch: Batch) -> Option<Batch> {
        let end = range.end.min(self.slots.len());
        let start = range.start.min(end);
        let mut remaining = Some(batch);

        for slot in &mut self.slots[start..end] {
            let Some(b) = remaining.take() else { break };
            if slot.batch().is_some_and(|held| held.stacks_with(&b)) {
                remaining = slot.insert(b);
            } else {
                remaining = Some(b);
            }
        }
        for slot in &mut self.slots[start..end] {
            let Some(b) = remaining.take() else { break };
            if slot.is_empty() {
                remaining = slot.insert(b);
            } else {
                remaining = Some(b);
            }
        }
        remaining
    }
}
