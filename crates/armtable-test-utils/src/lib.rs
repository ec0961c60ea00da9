//! Shared test fixtures and utilities for arm table crates.
//!
//! Provides canned arm topologies (well-formed and broken) and an observer
//! that records every controller notification for later assertions.

pub mod arms;
pub mod observer;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use arms::{
    branched_arm, disconnected_arm, pure_extension_arm, reversed_arm, six_joint_arm,
    two_joint_arm, PURE_EXTENSION_REACH,
};
pub use observer::RecordingObserver;
