//! Forward kinematics over an [`OrderedChain`].
//!
//! Each segment contributes one homogeneous transform, built from four
//! elementary steps applied in this order:
//!
//! 1. translate along Z (longitudinal) by the segment offset
//! 2. rotate about Z (vertical) by the start joint's angle
//! 3. translate along X (lateral) by the segment length
//! 4. for [`Orientation::Rotate`] start joints only, rotate about X by the
//!    segment twist
//!
//! The pose of chain joint `k` is the product of the first `k` segment
//! transforms, starting from the identity at the base. Evaluation is pure:
//! angles come in as a slice and nothing on the arm is touched.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use armtable_core::{EmptyInputError, KinematicsError, RangeError};
use armtable_model::{Arm, Orientation};

use crate::chain::{ChainSegment, OrderedChain};

impl OrderedChain {
    /// Cumulative transform from the base frame to the tip.
    ///
    /// `angles[k]` is the angle, in degrees, of chain joint `k`.
    pub fn forward_kinematics(&self, angles: &[i16]) -> Result<Matrix4<f64>, KinematicsError> {
        self.transform_to(angles, self.len().saturating_sub(1))
    }

    /// Cumulative transform from the base frame to chain joint `index`.
    pub fn transform_to(
        &self,
        angles: &[i16],
        index: usize,
    ) -> Result<Matrix4<f64>, KinematicsError> {
        self.check(angles)?;
        if index >= self.len() {
            return Err(RangeError::IndexOutOfRange {
                index,
                len: self.len(),
            }
            .into());
        }

        let transform = self.segments()[..index]
            .iter()
            .zip(angles)
            .fold(Matrix4::identity(), |acc, (segment, &angle)| {
                acc * segment_transform(segment, angle)
            });
        Ok(transform)
    }

    /// Position of chain joint `index` in the base frame.
    pub fn position_of(&self, angles: &[i16], index: usize) -> Result<Point3<f64>, KinematicsError> {
        self.transform_to(angles, index).map(|t| translation_of(&t))
    }

    /// Position of the tip joint in the base frame.
    pub fn end_effector(&self, angles: &[i16]) -> Result<Point3<f64>, KinematicsError> {
        self.forward_kinematics(angles).map(|t| translation_of(&t))
    }

    /// Positions of every chain joint, base first, in one pass.
    pub fn joint_positions(&self, angles: &[i16]) -> Result<Vec<Point3<f64>>, KinematicsError> {
        self.check(angles)?;

        let mut transform = Matrix4::identity();
        let mut positions = Vec::with_capacity(self.len());
        positions.push(translation_of(&transform));
        for (segment, &angle) in self.segments().iter().zip(angles) {
            transform *= segment_transform(segment, angle);
            positions.push(translation_of(&transform));
        }
        Ok(positions)
    }

    /// Position of chain joint `index` using the arm's current angles.
    pub fn position_in(&self, arm: &Arm, index: usize) -> Result<Point3<f64>, KinematicsError> {
        let angles = self.angles_from(arm)?;
        self.position_of(&angles, index)
    }

    fn check(&self, angles: &[i16]) -> Result<(), KinematicsError> {
        if self.is_empty() {
            return Err(EmptyInputError::EmptyChain.into());
        }
        if angles.len() != self.len() {
            return Err(RangeError::AngleCountMismatch {
                expected: self.len(),
                got: angles.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// Homogeneous transform contributed by one segment at `angle` degrees.
pub fn segment_transform(segment: &ChainSegment, angle: i16) -> Matrix4<f64> {
    let theta = f64::from(angle).to_radians();

    let mut transform = Matrix4::new_translation(&Vector3::new(0.0, 0.0, segment.offset))
        * Rotation3::from_axis_angle(&Vector3::z_axis(), theta).to_homogeneous()
        * Matrix4::new_translation(&Vector3::new(segment.length, 0.0, 0.0));
    if segment.orientation == Orientation::Rotate {
        transform *= Rotation3::from_axis_angle(&Vector3::x_axis(), segment.twist).to_homogeneous();
    }
    transform
}

/// Translation column of a homogeneous transform, i.e. the image of the origin.
fn translation_of(transform: &Matrix4<f64>) -> Point3<f64> {
    Point3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
