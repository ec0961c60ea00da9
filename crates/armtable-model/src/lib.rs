//! Topology model for a serial-link robotic arm.
//!
//! Provides the joint and linkage types, the [`Arm`] aggregate that owns
//! them, the built-in 6-joint arm, and a TOML arm description format whose
//! elements each carry an explicit `kind` discriminator.

pub mod description;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use description::{
    load_arm, parse_file, parse_string, ArmDescription, JointFields, JointSpec, LinkageFields,
    LinkageSpec,
};
pub use types::{Arm, Joint, Linkage, LinkageKind, Orientation};
