//! Bounded single-typed resource storage with a two-phase transfer protocol.
//!
//! Every operation takes an [`Action`]. `Simulate` computes the outcome and
//! leaves the buffer untouched; `Commit` runs the identical computation and
//! then applies exactly that amount. As long as nothing else mutates the
//! buffer in between, a simulate result always equals the effect of the
//! commit that follows it.

use serde::{Deserialize, Serialize};

use crate::error::{StateError, TransferError};
use crate::id::{ResourceKind, ResourceTypeId};
use crate::signal;

/// Whether a buffer operation only reports its outcome or also applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Simulate,
    Commit,
}

impl Action {
    pub fn commits(self) -> bool {
        matches!(self, Action::Commit)
    }
}

/// A typed amount, e.g. the current content of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceStack {
    pub resource: ResourceTypeId,
    pub amount: u32,
}

/// A bounded accumulator for one resource at a time.
///
/// Invariants: `amount <= capacity`, and `resource` is `None` exactly when
/// `amount == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBuffer {
    kind: ResourceKind,
    capacity: u32,
    amount: u32,
    resource: Option<ResourceTypeId>,
    transfer_rate: u32,
}

impl ResourceBuffer {
    /// Create an empty buffer. A zero capacity is raised to 1.
    pub fn new(kind: ResourceKind, capacity: u32, transfer_rate: u32) -> Self {
        Self {
            kind,
            capacity: capacity.max(1),
            amount: 0,
            resource: None,
            transfer_rate,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn resource(&self) -> Option<ResourceTypeId> {
        self.resource
    }

    pub fn transfer_rate(&self) -> u32 {
        self.transfer_rate
    }

    pub fn set_transfer_rate(&mut self, rate: u32) {
        self.transfer_rate = rate;
    }

    pub fn stored(&self) -> Option<ResourceStack> {
        self.resource.map(|resource| ResourceStack {
            resource,
            amount: self.amount,
        })
    }

    pub fn free_space(&self) -> u32 {
        self.capacity - self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.capacity
    }

    /// 0..=15 comparator-style fill level.
    pub fn analog_signal(&self) -> u8 {
        signal::analog_signal(self.amount as u64, self.capacity as u64)
    }

    /// The resource a fill must match, if any.
    fn expected_resource(&self) -> Option<ResourceTypeId> {
        match self.resource {
            Some(held) => Some(held),
            None if self.kind == ResourceKind::Energy => Some(ResourceTypeId::ENERGY),
            None => None,
        }
    }

    /// Compute how much of `resource` a fill of `amount` would accept, or why
    /// it would accept nothing.
    pub fn check_fill(&self, resource: ResourceTypeId, amount: u32) -> Result<u32, TransferError> {
        if let Some(held) = self.expected_resource()
            && held != resource
        {
            return Err(TransferError::IncompatibleType {
                held,
                offered: resource,
            });
        }
        Ok(amount.min(self.free_space()))
    }

    /// Offer `amount` of `resource`. Returns the amount accepted (or that
    /// would be accepted, when simulating).
    pub fn fill(&mut self, resource: ResourceTypeId, amount: u32, action: Action) -> u32 {
        let accepted = self.check_fill(resource, amount).unwrap_or(0);
        if action.commits() && accepted > 0 {
            self.amount += accepted;
            self.resource = Some(resource);
        }
        accepted
    }

    /// Fill all of `amount` or nothing.
    pub fn fill_exact(
        &mut self,
        resource: ResourceTypeId,
        amount: u32,
    ) -> Result<(), TransferError> {
        let available = self.check_fill(resource, amount)?;
        if available < amount {
            return Err(TransferError::CapacityExceeded {
                requested: amount,
                available,
            });
        }
        self.fill(resource, amount, Action::Commit);
        Ok(())
    }

    /// Remove up to `amount`. Returns the amount removed (or that would be).
    pub fn drain(&mut self, amount: u32, action: Action) -> u32 {
        let removed = amount.min(self.amount);
        if action.commits() && removed > 0 {
            self.amount -= removed;
            if self.amount == 0 {
                self.resource = None;
            }
        }
        removed
    }

    /// Drain all of `amount` or nothing.
    pub fn drain_exact(&mut self, amount: u32) -> Result<(), TransferError> {
        if self.amount < amount {
            return Err(TransferError::StarvedResource {
                kind: self.kind,
                required: amount,
                available: self.amount,
            });
        }
        self.drain(amount, Action::Commit);
        Ok(())
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.amount = 0;
        self.resource = None;
    }

    /// Change the capacity (configuration reload). A stored amount above the
    /// new capacity is cut down and reported.
    pub fn set_capacity(&mut self, capacity: u32) -> Option<StateError> {
        self.capacity = capacity.max(1);
        if self.amount <= self.capacity {
            return None;
        }
        let err = StateError::MalformedPersistedState {
            field: "buffer amount",
            value: self.amount as u64,
            clamped: self.capacity as u64,
        };
        self.amount = self.capacity;
        Some(err)
    }

    /// Overwrite the content from a persisted record, clamping into range.
    /// Returns every clamp that was necessary.
    pub fn restore(&mut self, amount: u32, resource: Option<ResourceTypeId>) -> Vec<StateError> {
        let mut errors = Vec::new();
        let mut amount = amount;
        if amount > self.capacity {
            errors.push(StateError::MalformedPersistedState {
                field: "buffer amount",
                value: amount as u64,
                clamped: self.capacity as u64,
            });
            amount = self.capacity;
        }
        match resource {
            Some(r) if amount > 0 => {
                self.amount = amount;
                self.resource = Some(r);
            }
            Some(_) => self.clear(),
            None => {
                if amount > 0 {
                    errors.push(StateError::MalformedPersistedState {
                        field: "untyped buffer amount",
                        value: amount as u64,
                        clamped: 0,
                    });
                }
                self.clear();
            }
        }
        errors
    }
}
