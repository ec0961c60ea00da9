//! Integration test: linearize fixture arms and evaluate forward kinematics.
//!
//! Checks that:
//! 1. A well-formed 6-joint arm yields a chain covering every joint, base first
//! 2. Broken topologies (no base, two bases, branches, gaps) are rejected
//!    without leaving chain indices behind
//! 3. Forward kinematics is repeatable and matches the pure-extension reach

use approx::assert_relative_eq;
use armtable_core::{ConfigurationError, JointId};
use armtable_kinematics::OrderedChain;
use armtable_model::{Arm, Joint, Linkage};
use armtable_test_utils::{
    branched_arm, disconnected_arm, pure_extension_arm, reversed_arm, six_joint_arm,
    PURE_EXTENSION_REACH,
};

fn assert_no_chain_indices(arm: &Arm) {
    for joint in arm.joints() {
        assert_eq!(joint.chain_index(), None, "{} kept an index", joint.name());
    }
}

#[test]
fn six_joint_chain_is_contiguous() {
    let mut arm = six_joint_arm();
    let chain = OrderedChain::linearize(&mut arm).unwrap();

    assert_eq!(chain.len(), arm.joint_count());
    assert!(arm.joint(chain.joints()[0]).unwrap().is_base());
    assert_eq!(chain.segments().len(), arm.linkage_count());

    for (i, segment) in chain.segments().iter().enumerate() {
        assert_eq!(segment.start, chain.joints()[i]);
        assert_eq!(segment.end, chain.joints()[i + 1]);
    }
    for (i, &id) in chain.joints().iter().enumerate() {
        assert_eq!(arm.joint(id).unwrap().chain_index(), Some(i));
    }
}

#[test]
fn reversed_linkage_is_walked_from_the_base() {
    let mut arm = reversed_arm();
    let chain = OrderedChain::linearize(&mut arm).unwrap();
    assert_eq!(chain.joints(), &[JointId(2), JointId(1), JointId(0)]);

    let tip = chain.end_effector(&chain.angles_from(&arm).unwrap()).unwrap();
    assert_relative_eq!(tip.x, 5.0, epsilon = 1e-9);
}

#[test]
fn zero_bases_is_rejected() {
    let mut arm = Arm::new(
        "headless",
        vec![Joint::rotary("A"), Joint::bend("B")],
        vec![Linkage::new("AB", JointId(0), JointId(1))],
    )
    .unwrap();
    assert_eq!(
        OrderedChain::linearize(&mut arm),
        Err(ConfigurationError::NoBaseJoint)
    );
    assert_no_chain_indices(&arm);
}

#[test]
fn two_bases_is_rejected() {
    let mut arm = Arm::new(
        "two_headed",
        vec![Joint::rotary("A").base(), Joint::bend("B").base()],
        vec![Linkage::new("AB", JointId(0), JointId(1))],
    )
    .unwrap();
    assert_eq!(
        OrderedChain::linearize(&mut arm),
        Err(ConfigurationError::MultipleBaseJoints { count: 2 })
    );
    assert_no_chain_indices(&arm);
}

#[test]
fn disconnected_segment_is_incomplete() {
    let mut arm = disconnected_arm();
    let err = OrderedChain::linearize(&mut arm).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::IncompleteChain {
            joints_reached: 2,
            joints_total: 4,
            linkages_reached: 1,
            linkages_total: 2,
        }
    );
    assert_no_chain_indices(&arm);
}

#[test]
fn branch_is_incomplete() {
    let mut arm = branched_arm();
    assert!(matches!(
        OrderedChain::linearize(&mut arm),
        Err(ConfigurationError::IncompleteChain { .. })
    ));
    assert_no_chain_indices(&arm);
}

#[test]
fn failed_relinearize_clears_previous_indices() {
    let mut arm = six_joint_arm();
    OrderedChain::linearize(&mut arm).unwrap();

    // Re-running on an arm that was valid must never leave stale indices
    // when the second attempt fails.
    let mut broken = Arm::new(
        arm.name().to_owned(),
        arm.joints().to_vec(),
        arm.linkages()[..3].to_vec(),
    )
    .unwrap();
    assert!(OrderedChain::linearize(&mut broken).is_err());
    assert_no_chain_indices(&broken);
}

#[test]
fn pure_extension_reach() {
    let arm = pure_extension_arm();
    let chain = OrderedChain::build(&arm).unwrap();
    let tip = chain.end_effector(&[0; 6]).unwrap();

    assert_relative_eq!(tip.x, PURE_EXTENSION_REACH, epsilon = 1e-9);
    assert_relative_eq!(tip.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(tip.z, 0.0, epsilon = 1e-9);
}

#[test]
fn forward_kinematics_is_repeatable() {
    let arm = six_joint_arm();
    let chain = OrderedChain::build(&arm).unwrap();
    let angles = chain.angles_from(&arm).unwrap();

    let first = chain.joint_positions(&angles).unwrap();
    let second = chain.joint_positions(&angles).unwrap();
    assert_eq!(first, second);
    assert_eq!(chain.forward_kinematics(&angles), chain.forward_kinematics(&angles));
}

#[test]
fn six_joint_home_pose_is_finite() {
    let arm = six_joint_arm();
    let chain = OrderedChain::build(&arm).unwrap();
    let positions = chain.joint_positions(&chain.angles_from(&arm).unwrap()).unwrap();
    assert_eq!(positions.len(), 6);
    assert!(positions.iter().all(|p| p.iter().all(|c| c.is_finite())));

    // The chain never gets longer than the sum of its links.
    let reach: f64 = arm.linkages().iter().map(|l| l.length).sum();
    assert!(positions[5].coords.norm() <= reach + 1e-9);
}
