//! Core data types for the in-memory arm topology.
//!
//! An [`Arm`] owns its joints and linkages. Linkages refer to the joints they
//! connect by [`JointId`], so joints are shared between the linkages that touch
//! them and outlive every one of them.

use armtable_core::{ConfigurationError, JointId, LinkageId, RangeError};

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// Axis-of-motion class of a rotational joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Hinge-like joint that bends the downstream linkage.
    Bend,
    /// Joint that spins about the chain, adding an axial twist.
    Rotate,
}

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// A rotational actuator.
///
/// Angles are signed integer degrees. The current angle only changes through
/// [`Arm::set_angle`], which enforces `min_angle <= angle <= max_angle`.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    orientation: Orientation,
    angle: i16,
    min_angle: i16,
    max_angle: i16,
    home_angle: i16,
    is_base: bool,
    chain_index: Option<usize>,
}

impl Joint {
    /// Create a joint at angle 0 with limits `[0, 360]`.
    pub fn new(name: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            name: name.into(),
            orientation,
            angle: 0,
            min_angle: 0,
            max_angle: 360,
            home_angle: 0,
            is_base: false,
            chain_index: None,
        }
    }

    /// Shorthand for a [`Orientation::Rotate`] joint.
    pub fn rotary(name: impl Into<String>) -> Self {
        Self::new(name, Orientation::Rotate)
    }

    /// Shorthand for a [`Orientation::Bend`] joint.
    pub fn bend(name: impl Into<String>) -> Self {
        Self::new(name, Orientation::Bend)
    }

    #[must_use]
    pub const fn with_limits(mut self, min_angle: i16, max_angle: i16) -> Self {
        self.min_angle = min_angle;
        self.max_angle = max_angle;
        self
    }

    /// Set the starting angle. Checked against the limits by [`Arm::new`].
    #[must_use]
    pub const fn with_angle(mut self, angle: i16) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub const fn with_home(mut self, home_angle: i16) -> Self {
        self.home_angle = home_angle;
        self
    }

    /// Mark this joint as the root of the kinematic chain.
    #[must_use]
    pub const fn base(mut self) -> Self {
        self.is_base = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub const fn angle(&self) -> i16 {
        self.angle
    }

    pub const fn min_angle(&self) -> i16 {
        self.min_angle
    }

    pub const fn max_angle(&self) -> i16 {
        self.max_angle
    }

    pub const fn home_angle(&self) -> i16 {
        self.home_angle
    }

    pub const fn is_base(&self) -> bool {
        self.is_base
    }

    /// Position in the linearized chain (0 = base). `None` until the arm is
    /// initialized.
    pub const fn chain_index(&self) -> Option<usize> {
        self.chain_index
    }

    /// Whether `degrees` lies within `[min_angle, max_angle]`.
    pub const fn accepts(&self, degrees: i16) -> bool {
        degrees >= self.min_angle && degrees <= self.max_angle
    }

    fn check_limits(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [("current", self.angle), ("home", self.home_angle)] {
            if !self.accepts(value) {
                return Err(ConfigurationError::InvalidJointLimits {
                    joint: self.name.clone(),
                    field,
                    value,
                    min: self.min_angle,
                    max: self.max_angle,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Linkage
// ---------------------------------------------------------------------------

/// Linkage variant. Only straight rigid segments exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkageKind {
    #[default]
    Standard,
}

/// A rigid segment connecting two joints.
///
/// `radius`, `width` and `reach` describe the physical part; kinematics only
/// reads `offset`, `length` and `twist_degrees`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    pub name: String,
    pub kind: LinkageKind,
    /// Distance between the joint axes along the lateral axis.
    pub length: f64,
    /// Translation along the longitudinal axis applied before the joint rotation.
    pub offset: f64,
    /// Axial twist applied when the start joint is [`Orientation::Rotate`].
    pub twist_degrees: f64,
    pub radius: f64,
    pub width: f64,
    pub reach: f64,
    pub start: JointId,
    pub end: JointId,
}

impl Linkage {
    /// Create a zero-length linkage from `start` to `end`.
    pub fn new(name: impl Into<String>, start: JointId, end: JointId) -> Self {
        Self {
            name: name.into(),
            kind: LinkageKind::Standard,
            length: 0.0,
            offset: 0.0,
            twist_degrees: 0.0,
            radius: 0.0,
            width: 0.0,
            reach: 0.0,
            start,
            end,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_twist(mut self, twist_degrees: f64) -> Self {
        self.twist_degrees = twist_degrees;
        self
    }

    /// Whether `joint` is one of this linkage's endpoints.
    pub fn touches(&self, joint: JointId) -> bool {
        self.start == joint || self.end == joint
    }

    /// The endpoint opposite `joint`, if `joint` is an endpoint.
    pub fn other_end(&self, joint: JointId) -> Option<JointId> {
        if self.start == joint {
            Some(self.end)
        } else if self.end == joint {
            Some(self.start)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Arm
// ---------------------------------------------------------------------------

/// All joints and linkages of one robot.
///
/// Topology is fixed after construction; only joint angles (and the chain
/// indices assigned at initialization) change.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    name: String,
    joints: Vec<Joint>,
    linkages: Vec<Linkage>,
}

impl Arm {
    /// Build an arm, checking structural sanity only.
    ///
    /// Linkage endpoints must name existing, distinct joints, and every
    /// joint's current and home angles must lie within its limits. Base-joint
    /// count and connectivity are checked later, when the chain is built.
    pub fn new(
        name: impl Into<String>,
        joints: Vec<Joint>,
        linkages: Vec<Linkage>,
    ) -> Result<Self, ConfigurationError> {
        for joint in &joints {
            joint.check_limits()?;
        }
        for linkage in &linkages {
            for endpoint in [linkage.start, linkage.end] {
                if endpoint.index() >= joints.len() {
                    return Err(ConfigurationError::UnknownJoint {
                        linkage: linkage.name.clone(),
                        joint: endpoint.to_string(),
                    });
                }
            }
            if linkage.start == linkage.end {
                return Err(ConfigurationError::SelfLinkage {
                    linkage: linkage.name.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            joints,
            linkages,
        })
    }

    /// The built-in 6-joint table arm.
    ///
    /// Lengths are in millimetres: a 152.4 bicep, a 76.2 forearm and a 25
    /// wrist segment. The two shoulder linkages have zero length; the one
    /// leaving `ShoulderRotate` carries a 90 degree twist, so the shoulder,
    /// elbow and wrist bends pitch in a vertical plane that the shoulder
    /// rotations swing about the vertical axis.
    pub fn six_joint() -> Self {
        let joints = vec![
            Joint::rotary("ShoulderBase").with_limits(0, 360).base(),
            Joint::rotary("ShoulderRotate").with_limits(0, 180),
            Joint::bend("ShoulderUpDown")
                .with_limits(0, 180)
                .with_angle(90)
                .with_home(90),
            Joint::bend("Elbow")
                .with_limits(-45, 225)
                .with_angle(90)
                .with_home(90),
            Joint::bend("WristBend")
                .with_limits(-45, 225)
                .with_angle(90)
                .with_home(90),
            Joint::rotary("WristRotate").with_limits(0, 360),
        ];
        let linkages = vec![
            Linkage::new("ShoulderBaseToUpDown", JointId(0), JointId(1)),
            Linkage::new("ShoulderUpDownToRotate", JointId(1), JointId(2)).with_twist(90.0),
            Linkage::new("Bicep", JointId(2), JointId(3)).with_length(152.4),
            Linkage::new("Forearm", JointId(3), JointId(4)).with_length(76.2),
            Linkage::new("WristToWristRotate", JointId(4), JointId(5)).with_length(25.0),
        ];
        Self {
            name: "six_joint_arm".into(),
            joints,
            linkages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn linkages(&self) -> &[Linkage] {
        &self.linkages
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn linkage_count(&self) -> usize {
        self.linkages.len()
    }

    /// Get a joint by id.
    pub fn joint(&self, id: JointId) -> Result<&Joint, RangeError> {
        self.joints.get(id.index()).ok_or(RangeError::UnknownJoint(id))
    }

    /// Get a linkage by id.
    pub fn linkage(&self, id: LinkageId) -> Result<&Linkage, RangeError> {
        self.linkages
            .get(id.index())
            .ok_or(RangeError::UnknownLinkage(id))
    }

    /// First joint declared with `name`.
    pub fn joint_id(&self, name: &str) -> Option<JointId> {
        self.joints.iter().position(|j| j.name == name).map(JointId)
    }

    /// Iterate over `(id, joint)` pairs in declaration order.
    pub fn iter_joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().enumerate().map(|(i, j)| (JointId(i), j))
    }

    /// Iterate over `(id, linkage)` pairs in declaration order.
    pub fn iter_linkages(&self) -> impl Iterator<Item = (LinkageId, &Linkage)> {
        self.linkages
            .iter()
            .enumerate()
            .map(|(i, l)| (LinkageId(i), l))
    }

    /// Current angles in declaration order.
    pub fn angles(&self) -> Vec<i16> {
        self.joints.iter().map(Joint::angle).collect()
    }

    /// Set a joint's current angle, returning the previous one.
    ///
    /// Angles outside the joint's limits are rejected and leave the joint
    /// unchanged; nothing is clamped.
    pub fn set_angle(&mut self, id: JointId, degrees: i16) -> Result<i16, RangeError> {
        let joint = self
            .joints
            .get_mut(id.index())
            .ok_or(RangeError::UnknownJoint(id))?;
        if !joint.accepts(degrees) {
            return Err(RangeError::OutOfRangeAngle {
                joint: id,
                requested: degrees,
                min: joint.min_angle,
                max: joint.max_angle,
            });
        }
        Ok(std::mem::replace(&mut joint.angle, degrees))
    }

    /// Move every joint to its home angle.
    ///
    /// Returns `(id, previous, home)` for each joint whose angle changed.
    pub fn home(&mut self) -> Vec<(JointId, i16, i16)> {
        self.joints
            .iter_mut()
            .enumerate()
            .filter(|(_, j)| j.angle != j.home_angle)
            .map(|(i, j)| {
                let previous = std::mem::replace(&mut j.angle, j.home_angle);
                (JointId(i), previous, j.home_angle)
            })
            .collect()
    }

    /// Record each joint's position in the linearized chain.
    ///
    /// `order[k]` is the joint at chain index `k`. Joints not listed are left
    /// without an index.
    pub fn assign_chain_indices(&mut self, order: &[JointId]) {
        for joint in &mut self.joints {
            joint.chain_index = None;
        }
        for (chain_index, id) in order.iter().enumerate() {
            if let Some(joint) = self.joints.get_mut(id.index()) {
                joint.chain_index = Some(chain_index);
            }
        }
    }
}

impl Default for Arm {
    fn default() -> Self {
        Self::six_joint()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
