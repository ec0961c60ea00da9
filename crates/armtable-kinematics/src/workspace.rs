//! Brute-force workspace enumeration.
//!
//! For every joint `J` of the chain (the angle being solved for) and every
//! other joint `K`, the enumerator sweeps `K` across the global angle range
//! intersected with `K`'s own limits, holding every other joint at its
//! current angle. Each sample records the position reached by the linkage
//! leaving `K` (the tip itself for the last joint), quantized onto a grid,
//! together with the angle that produced it. A joint whose limits miss the
//! global range fails the whole sweep before any sampling.
//!
//! This costs `O(J² · A)` forward-kinematics evaluations and is meant to run
//! once, ahead of use. The resulting [`WorkspaceTable`] answers "which angle
//! of `K` lands near this point", not an exact inverse-kinematics solution.

use std::collections::HashMap;

use nalgebra::Point3;

use armtable_core::{ArmError, ConfigurationError, EmptyInputError, WorkspaceConfig};
use armtable_model::Arm;

use crate::chain::OrderedChain;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A coordinate rounded onto a grid of fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridKey {
    /// Round `point` to the nearest grid cell of size `resolution`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantize(point: &Point3<f64>, resolution: f64) -> Self {
        let q = |v: f64| (v / resolution).round() as i64;
        Self {
            x: q(point.x),
            y: q(point.y),
            z: q(point.z),
        }
    }

    /// Centre of this cell.
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self, resolution: f64) -> Point3<f64> {
        Point3::new(
            self.x as f64 * resolution,
            self.y as f64 * resolution,
            self.z as f64 * resolution,
        )
    }
}

/// Lookup key: a grid cell plus the chain index of the swept joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceKey {
    pub cell: GridKey,
    pub joint: usize,
}

/// One sample of the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEntry {
    /// Chain index of the joint being solved for.
    pub solving: usize,
    /// Chain index of the swept joint.
    pub joint: usize,
    /// Angle of the swept joint that produced `position`.
    pub angle: i16,
    /// Unquantized position reached.
    pub position: Point3<f64>,
    pub key: WorkspaceKey,
}

// ---------------------------------------------------------------------------
// WorkspaceTable
// ---------------------------------------------------------------------------

/// Result of a completed sweep.
#[derive(Debug, Clone)]
pub struct WorkspaceTable {
    resolution: f64,
    range: (i16, i16),
    baseline: Vec<i16>,
    entries: Vec<WorkspaceEntry>,
    /// First entry recorded for each key. The terminal joint is not indexed.
    index: HashMap<WorkspaceKey, usize>,
}

impl WorkspaceTable {
    /// Grid resolution used for the keys.
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Global `[min, max]` angle range that was swept.
    pub const fn range(&self) -> (i16, i16) {
        self.range
    }

    /// Chain-order angles every non-swept joint was held at.
    pub fn baseline(&self) -> &[i16] {
        &self.baseline
    }

    /// All samples, in sweep order.
    pub fn entries(&self) -> &[WorkspaceEntry] {
        &self.entries
    }

    /// Samples for one (solving joint, swept joint) pair.
    pub fn entries_for(
        &self,
        solving: usize,
        joint: usize,
    ) -> impl Iterator<Item = &WorkspaceEntry> {
        self.entries
            .iter()
            .filter(move |e| e.solving == solving && e.joint == joint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    /// Key for `position` reached by swept joint `joint`.
    pub fn key_for(&self, joint: usize, position: &Point3<f64>) -> WorkspaceKey {
        WorkspaceKey {
            cell: GridKey::quantize(position, self.resolution),
            joint,
        }
    }

    /// First recorded angle of `joint` whose sample falls in the same grid
    /// cell as `position`.
    ///
    /// Always `None` for the terminal joint: its angle spins the tip in place,
    /// so its samples all share one cell and say nothing about the angle.
    pub fn lookup(&self, joint: usize, position: &Point3<f64>) -> Option<i16> {
        self.index
            .get(&self.key_for(joint, position))
            .map(|&i| self.entries[i].angle)
    }

    /// Sample of `joint` closest to `position`. Ties keep the earliest sample.
    pub fn nearest(&self, joint: usize, position: &Point3<f64>) -> Option<&WorkspaceEntry> {
        self.entries
            .iter()
            .filter(|e| e.joint == joint)
            .fold(None, |best: Option<(&WorkspaceEntry, f64)>, e| {
                let d = (e.position - *position).norm_squared();
                match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((e, d)),
                }
            })
            .map(|(e, _)| e)
    }
}

// ---------------------------------------------------------------------------
// WorkspaceEnumerator
// ---------------------------------------------------------------------------

/// Sweeps joint angles to build a [`WorkspaceTable`].
#[derive(Debug, Clone, Default)]
pub struct WorkspaceEnumerator {
    config: WorkspaceConfig,
}

impl WorkspaceEnumerator {
    pub const fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub const fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Global sweep range.
    ///
    /// Configured bounds win. Otherwise the range runs from the smallest joint
    /// minimum to the smallest joint maximum, so no joint is asked to sweep
    /// past the tightest upper limit of the arm.
    pub fn angle_range(&self, arm: &Arm, chain: &OrderedChain) -> Result<(i16, i16), ArmError> {
        let joints = chain
            .joints()
            .iter()
            .map(|&id| arm.joint(id))
            .collect::<Result<Vec<_>, _>>()?;

        let min = self
            .config
            .min_angle
            .or_else(|| joints.iter().map(|j| j.min_angle()).min());
        let max = self
            .config
            .max_angle
            .or_else(|| joints.iter().map(|j| j.max_angle()).min());

        match (min, max) {
            (Some(min), Some(max)) if min <= max => Ok((min, max)),
            (Some(min), Some(max)) => Err(ConfigurationError::EmptyAngleRange { min, max }.into()),
            _ => Err(EmptyInputError::EmptyChain.into()),
        }
    }

    /// Per-joint `[lo, hi]`: the global range clipped to each joint's limits.
    ///
    /// Fails if any joint's limits miss the global range entirely, since that
    /// joint would contribute no samples.
    pub fn sweep_ranges(
        arm: &Arm,
        chain: &OrderedChain,
        (min, max): (i16, i16),
    ) -> Result<Vec<(i16, i16)>, ArmError> {
        let mut ranges = Vec::with_capacity(chain.len());
        for &id in chain.joints() {
            let joint = arm.joint(id)?;
            let lo = min.max(joint.min_angle());
            let hi = max.min(joint.max_angle());
            if lo > hi {
                return Err(ConfigurationError::JointOutsideSweep {
                    joint: joint.name().to_owned(),
                    joint_min: joint.min_angle(),
                    joint_max: joint.max_angle(),
                    min,
                    max,
                }
                .into());
            }
            ranges.push((lo, hi));
        }
        Ok(ranges)
    }

    /// Run the full sweep.
    ///
    /// Either every sample is recorded or an error is returned before any
    /// sampling starts. The arm is read, never modified.
    pub fn enumerate(&self, arm: &Arm, chain: &OrderedChain) -> Result<WorkspaceTable, ArmError> {
        self.config.validate()?;
        if chain.is_empty() {
            return Err(EmptyInputError::EmptyChain.into());
        }
        let (global_min, global_max) = self.angle_range(arm, chain)?;
        let baseline = chain.angles_from(arm)?;
        let sweeps = Self::sweep_ranges(arm, chain, (global_min, global_max))?;

        let resolution = self.config.resolution;
        let step = usize::from(self.config.step_degrees);
        let last = chain.len() - 1;

        let mut entries = Vec::new();
        let mut index = HashMap::new();
        let mut angles = baseline.clone();

        for solving in 0..chain.len() {
            for (joint, &(lo, hi)) in sweeps.iter().enumerate() {
                if joint == solving {
                    continue;
                }
                let target = (joint + 1).min(last);
                let before = entries.len();

                for angle in (lo..=hi).step_by(step) {
                    angles[joint] = angle;
                    let position = chain.position_of(&angles, target)?;
                    let key = WorkspaceKey {
                        cell: GridKey::quantize(&position, resolution),
                        joint,
                    };
                    if joint != last {
                        index.entry(key).or_insert(entries.len());
                    }
                    entries.push(WorkspaceEntry {
                        solving,
                        joint,
                        angle,
                        position,
                        key,
                    });
                }
                angles[joint] = baseline[joint];

                tracing::debug!(
                    solving,
                    joint,
                    lo,
                    hi,
                    samples = entries.len() - before,
                    "joint swept"
                );
            }
        }

        tracing::info!(
            entries = entries.len(),
            keys = index.len(),
            min = global_min,
            max = global_max,
            resolution,
            "workspace enumerated"
        );

        Ok(WorkspaceTable {
            resolution,
            range: (global_min, global_max),
            baseline,
            entries,
            index,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
