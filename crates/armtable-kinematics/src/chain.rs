//! Ordered kinematic chain linearized from an [`Arm`].
//!
//! An [`OrderedChain`] lists the arm's joints from the base joint to the tip,
//! with a parallel list of segments: segment `i` runs from chain joint `i` to
//! chain joint `i + 1`. It stores the linkage geometry forward kinematics
//! needs, so evaluating a pose only requires the current angles.

use armtable_core::{ConfigurationError, JointId, LinkageId, RangeError};
use armtable_model::{Arm, Orientation};

/// One linkage, oriented from its chain-order start joint to its end joint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSegment {
    /// Linkage this segment was built from.
    pub linkage: LinkageId,
    /// Joint closer to the base. Its angle drives this segment.
    pub start: JointId,
    /// Joint closer to the tip.
    pub end: JointId,
    /// Orientation of the start joint.
    pub orientation: Orientation,
    /// Longitudinal translation before the joint rotation.
    pub offset: f64,
    /// Lateral translation after the joint rotation.
    pub length: f64,
    /// Axial twist in radians, applied only for [`Orientation::Rotate`].
    pub twist: f64,
}

/// An ordered chain from the base joint to the tip.
///
/// Only produced by [`OrderedChain::build`] after the whole arm has been
/// traversed, so every joint and linkage of the arm appears exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedChain {
    /// Joints in chain order; index 0 is the base joint.
    joints: Vec<JointId>,
    /// Segments in chain order; `segments.len() == joints.len() - 1`.
    segments: Vec<ChainSegment>,
}

impl OrderedChain {
    /// Linearize the arm's joint/linkage graph starting from its base joint.
    ///
    /// The walk starts at the first linkage (in declaration order) whose start
    /// joint is the base, then repeatedly follows the first unvisited linkage
    /// touching the current tip. A linkage declared end-to-start is traversed
    /// in reverse. The result is only returned once every joint and linkage
    /// has been placed.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NoBaseJoint`] / [`ConfigurationError::MultipleBaseJoints`]
    /// - [`ConfigurationError::DisconnectedBase`] if no linkage starts at the base
    /// - [`ConfigurationError::IncompleteChain`] for branches, cycles and
    ///   disconnected segments
    pub fn build(arm: &Arm) -> Result<Self, ConfigurationError> {
        let base = find_base(arm)?;

        let first = arm
            .iter_linkages()
            .find(|(_, l)| l.start == base)
            .map(|(id, _)| id)
            .ok_or_else(|| ConfigurationError::DisconnectedBase {
                base: arm.joints()[base.index()].name().to_owned(),
            })?;

        let mut builder = ChainBuilder::new(arm, base);
        let mut next = Some(first);
        while let Some(linkage) = next {
            if !builder.traverse(linkage) {
                break;
            }
            next = builder.next_linkage();
        }
        builder.finish()
    }

    /// Build the chain and record each joint's chain index on the arm.
    ///
    /// Indices are only written on success. A failed attempt clears any
    /// indices left over from an earlier one.
    pub fn linearize(arm: &mut Arm) -> Result<Self, ConfigurationError> {
        match Self::build(arm) {
            Ok(chain) => {
                arm.assign_chain_indices(&chain.joints);
                Ok(chain)
            }
            Err(err) => {
                arm.assign_chain_indices(&[]);
                Err(err)
            }
        }
    }

    /// Joints in chain order.
    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }

    /// Segments in chain order.
    pub fn segments(&self) -> &[ChainSegment] {
        &self.segments
    }

    /// Linkages in chain order.
    pub fn linkages(&self) -> Vec<LinkageId> {
        self.segments.iter().map(|s| s.linkage).collect()
    }

    /// Number of joints in the chain.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joint at `index` (0 = base).
    pub fn joint_at(&self, index: usize) -> Result<JointId, RangeError> {
        self.joints
            .get(index)
            .copied()
            .ok_or(RangeError::IndexOutOfRange {
                index,
                len: self.joints.len(),
            })
    }

    /// Chain index of `joint`, if it is part of the chain.
    pub fn index_of(&self, joint: JointId) -> Option<usize> {
        self.joints.iter().position(|&j| j == joint)
    }

    /// Current angles of `arm`, in chain order.
    pub fn angles_from(&self, arm: &Arm) -> Result<Vec<i16>, RangeError> {
        self.joints
            .iter()
            .map(|&id| arm.joint(id).map(|j| j.angle()))
            .collect()
    }

    /// Check chain-order `angles` against each joint's limits.
    ///
    /// Forward kinematics itself does not look at limits; callers holding
    /// angles from outside the arm run them through here first.
    pub fn check_angles(&self, arm: &Arm, angles: &[i16]) -> Result<(), RangeError> {
        if angles.len() != self.len() {
            return Err(RangeError::AngleCountMismatch {
                expected: self.len(),
                got: angles.len(),
            });
        }
        for (&id, &degrees) in self.joints.iter().zip(angles) {
            let joint = arm.joint(id)?;
            if !joint.accepts(degrees) {
                return Err(RangeError::OutOfRangeAngle {
                    joint: id,
                    requested: degrees,
                    min: joint.min_angle(),
                    max: joint.max_angle(),
                });
            }
        }
        Ok(())
    }
}

fn find_base(arm: &Arm) -> Result<JointId, ConfigurationError> {
    let mut bases = arm.iter_joints().filter(|(_, j)| j.is_base()).map(|(id, _)| id);
    let base = bases.next().ok_or(ConfigurationError::NoBaseJoint)?;
    let extra = bases.count();
    if extra > 0 {
        return Err(ConfigurationError::MultipleBaseJoints { count: extra + 1 });
    }
    Ok(base)
}

// ---------------------------------------------------------------------------
// ChainBuilder
// ---------------------------------------------------------------------------

/// Accumulates the walk. Nothing is exposed until [`finish`](Self::finish)
/// has checked that the whole arm was covered.
struct ChainBuilder<'a> {
    arm: &'a Arm,
    visited: Vec<bool>,
    placed: Vec<bool>,
    tip: JointId,
    joints: Vec<JointId>,
    segments: Vec<ChainSegment>,
}

impl<'a> ChainBuilder<'a> {
    fn new(arm: &'a Arm, base: JointId) -> Self {
        let mut placed = vec![false; arm.joint_count()];
        placed[base.index()] = true;
        Self {
            arm,
            visited: vec![false; arm.linkage_count()],
            placed,
            tip: base,
            joints: vec![base],
            segments: Vec::with_capacity(arm.linkage_count()),
        }
    }

    /// Walk `id` from the current tip. Returns false if it leads back into
    /// the chain (a cycle).
    fn traverse(&mut self, id: LinkageId) -> bool {
        let linkage = &self.arm.linkages()[id.index()];
        self.visited[id.index()] = true;

        let Some(end) = linkage.other_end(self.tip) else {
            return false;
        };
        if self.placed[end.index()] {
            tracing::debug!(linkage = %linkage.name, "linkage closes a cycle");
            return false;
        }

        let start = self.arm.joints()[self.tip.index()].orientation();
        self.segments.push(ChainSegment {
            linkage: id,
            start: self.tip,
            end,
            orientation: start,
            offset: linkage.offset,
            length: linkage.length,
            twist: linkage.twist_degrees.to_radians(),
        });
        self.placed[end.index()] = true;
        self.joints.push(end);
        self.tip = end;

        tracing::debug!(
            linkage = %linkage.name,
            joint = %self.arm.joints()[end.index()].name(),
            chain_index = self.joints.len() - 1,
            "chain extended"
        );
        true
    }

    /// First unvisited linkage, in declaration order, touching the tip.
    fn next_linkage(&self) -> Option<LinkageId> {
        self.arm
            .iter_linkages()
            .find(|(id, l)| !self.visited[id.index()] && l.touches(self.tip))
            .map(|(id, _)| id)
    }

    fn finish(self) -> Result<OrderedChain, ConfigurationError> {
        let joints_total = self.arm.joint_count();
        let linkages_total = self.arm.linkage_count();
        if self.joints.len() != joints_total || self.segments.len() != linkages_total {
            return Err(ConfigurationError::IncompleteChain {
                joints_reached: self.joints.len(),
                joints_total,
                linkages_reached: self.segments.len(),
                linkages_total,
            });
        }
        Ok(OrderedChain {
            joints: self.joints,
            segments: self.segments,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
