//! Roost Core -- shared building blocks for the production & conversion
//! engine.
//!
//! Every machine in the workspace is built from the same pieces:
//!
//! - [`buffer::ResourceBuffer`] -- a bounded single-typed store with the
//!   two-phase simulate/commit protocol.
//! - [`transfer`] -- the [`transfer::ResourceHandler`] seam between machines
//!   and the push-to-neighbor routine.
//! - [`item`] -- batches and role-limited slots.
//! - [`registry::Registry`] -- sources, crack tables, recipe overrides and the
//!   resource-to-source lookup cache.
//! - [`config::RoostConfig`] -- host-supplied capacities, rates, speeds and
//!   toggles.
//! - [`event::MachineEvent`] and [`signal`] -- what observers see.
//! - [`persist`] -- saved records and clamp-on-load helpers.
//!
//! # Tick model
//!
//! The host calls one tick per machine per simulation step. A tick runs to
//! completion; the only path by which one machine mutates another is
//! [`transfer::transfer`], which always simulates both sides before
//! committing.

pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod fixed;
pub mod id;
pub mod item;
pub mod persist;
pub mod registry;
pub mod rng;
pub mod signal;
pub mod transfer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
