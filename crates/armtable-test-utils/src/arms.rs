//! Arm fixtures.
//!
//! All builders panic on invalid input; they are only meant for tests.

use armtable_core::JointId;
use armtable_model::{Arm, Joint, Linkage};

/// Sum of the pure-extension arm's linkage lengths.
pub const PURE_EXTENSION_REACH: f64 = 152.4 + 76.2 + 25.0;

/// The built-in 6-joint arm.
pub fn six_joint_arm() -> Arm {
    Arm::six_joint()
}

/// Six bend joints in a straight line with lengths `[0, 0, 152.4, 76.2, 25]`
/// and every angle at zero, so the tip sits at `(PURE_EXTENSION_REACH, 0, 0)`.
pub fn pure_extension_arm() -> Arm {
    let joints = (0..6)
        .map(|i| {
            let joint = Joint::bend(format!("J{i}")).with_limits(-180, 180);
            if i == 0 {
                joint.base()
            } else {
                joint
            }
        })
        .collect();
    let linkages = [0.0, 0.0, 152.4, 76.2, 25.0]
        .iter()
        .enumerate()
        .map(|(i, &length)| {
            Linkage::new(format!("L{i}"), JointId(i), JointId(i + 1)).with_length(length)
        })
        .collect();
    Arm::new("pure_extension", joints, linkages).expect("pure extension arm")
}

/// Two bend joints, both limited to `[min, max]`, joined by a 10-unit link.
pub fn two_joint_arm(min: i16, max: i16) -> Arm {
    Arm::new(
        "two_joint",
        vec![
            Joint::bend("A")
                .with_limits(min, max)
                .with_angle(min)
                .with_home(min)
                .base(),
            Joint::bend("B")
                .with_limits(min, max)
                .with_angle(min)
                .with_home(min),
        ],
        vec![Linkage::new("AB", JointId(0), JointId(1)).with_length(10.0)],
    )
    .expect("two joint arm")
}

/// Three joints declared tip-first. `A -> B` leaves the base; the second
/// linkage is stored as `C -> B`, end-to-start relative to the walk.
pub fn reversed_arm() -> Arm {
    Arm::new(
        "reversed",
        vec![
            Joint::bend("C"),
            Joint::bend("B"),
            Joint::rotary("A").base(),
        ],
        vec![
            Linkage::new("CB", JointId(0), JointId(1)).with_length(2.0),
            Linkage::new("AB", JointId(2), JointId(1)).with_length(3.0),
        ],
    )
    .expect("reversed arm")
}

/// A base with two children: `A -> B` and `A -> C`.
pub fn branched_arm() -> Arm {
    Arm::new(
        "branched",
        vec![
            Joint::rotary("A").base(),
            Joint::bend("B"),
            Joint::bend("C"),
        ],
        vec![
            Linkage::new("AB", JointId(0), JointId(1)).with_length(1.0),
            Linkage::new("AC", JointId(0), JointId(2)).with_length(1.0),
        ],
    )
    .expect("branched arm")
}

/// `A -> B` plus an unreachable `C -> D`.
pub fn disconnected_arm() -> Arm {
    Arm::new(
        "disconnected",
        vec![
            Joint::rotary("A").base(),
            Joint::bend("B"),
            Joint::bend("C"),
            Joint::bend("D"),
        ],
        vec![
            Linkage::new("AB", JointId(0), JointId(1)).with_length(1.0),
            Linkage::new("CD", JointId(2), JointId(3)).with_length(1.0),
        ],
    )
    .expect("disconnected arm")
}
