//! Kinematics for a serial-link robotic arm.
//!
//! Linearizes an arm's joint/linkage graph into an ordered chain, evaluates
//! forward kinematics over that chain, and enumerates a coarse
//! coordinate-to-angle table by sweeping joint angles.
//!
//! # Architecture
//!
//! ```text
//! Arm ──► OrderedChain ──► forward kinematics ──► positions
//!                    └───► WorkspaceEnumerator ──► WorkspaceTable
//! ```
//!
//! The [`ArmController`] ties these together for a host: it owns the arm,
//! builds the chain on initialization, validates turns, and notifies
//! observers synchronously.

pub mod chain;
pub mod controller;
pub mod fk;
pub mod workspace;

pub use chain::{ChainSegment, OrderedChain};
pub use controller::{ArmController, ArmEvent, ArmObserver};
pub use workspace::{GridKey, WorkspaceEntry, WorkspaceEnumerator, WorkspaceKey, WorkspaceTable};
