use std::path::PathBuf;

use thiserror::Error;

use crate::types::{JointId, LinkageId};

/// Top-level error type for the arm table crates.
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Empty input: {0}")]
    EmptyInput(#[from] EmptyInputError),

    #[error("Config file error: {0}")]
    Config(#[from] ConfigError),

    #[error("no joint named '{0}'")]
    UnknownJointName(String),
}

/// Fatal problems with the arm topology or the workspace sweep setup.
///
/// Never recovered from: initialization aborts and no chain is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no base joint specified")]
    NoBaseJoint,

    #[error("multiple base joints specified: {count}")]
    MultipleBaseJoints { count: usize },

    #[error("no linkage starts at base joint '{base}'")]
    DisconnectedBase { base: String },

    #[error(
        "incomplete chain: reached {joints_reached}/{joints_total} joints and \
         {linkages_reached}/{linkages_total} linkages"
    )]
    IncompleteChain {
        joints_reached: usize,
        joints_total: usize,
        linkages_reached: usize,
        linkages_total: usize,
    },

    #[error("empty angle range: {min} > {max}")]
    EmptyAngleRange { min: i16, max: i16 },

    #[error("joint '{joint}' limits [{joint_min}, {joint_max}] miss the sweep range [{min}, {max}]")]
    JointOutsideSweep {
        joint: String,
        joint_min: i16,
        joint_max: i16,
        min: i16,
        max: i16,
    },

    #[error("linkage '{linkage}' starts and ends at the same joint")]
    SelfLinkage { linkage: String },

    #[error("linkage '{linkage}' references unknown joint '{joint}'")]
    UnknownJoint { linkage: String, joint: String },

    #[error("joint name '{0}' is declared more than once and cannot be referenced")]
    AmbiguousJointName(String),

    #[error("joint '{joint}' {field} angle {value} outside limits [{min}, {max}]")]
    InvalidJointLimits {
        joint: String,
        field: &'static str,
        value: i16,
        min: i16,
        max: i16,
    },
}

/// Requests rejected at the boundary. The operation has no effect.
///
/// Copy + index-only payloads for cheap propagation from the kinematics path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("angle {requested} for {joint} outside [{min}, {max}]")]
    OutOfRangeAngle {
        joint: JointId,
        requested: i16,
        min: i16,
        max: i16,
    },

    #[error("chain index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("angle count mismatch: expected {expected}, got {got}")]
    AngleCountMismatch { expected: usize, got: usize },

    #[error("unknown {0}")]
    UnknownJoint(JointId),

    #[error("unknown {0}")]
    UnknownLinkage(LinkageId),
}

/// Empty inputs handed to an operation that needs at least one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmptyInputError {
    #[error("kinematic chain is empty")]
    EmptyChain,
}

/// Failure of a single forward-kinematics request.
///
/// Aborts only that computation; the arm and chain are untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KinematicsError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
}

impl From<KinematicsError> for ArmError {
    fn from(err: KinematicsError) -> Self {
        match err {
            KinematicsError::Range(e) => Self::Range(e),
            KinematicsError::EmptyInput(e) => Self::EmptyInput(e),
        }
    }
}

/// Errors loading configuration or arm description files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_error_from_configuration_error() {
        let err: ArmError = ConfigurationError::NoBaseJoint.into();
        assert!(matches!(err, ArmError::Configuration(_)));
        assert!(err.to_string().contains("no base joint"));
    }

    #[test]
    fn arm_error_from_range_error() {
        let err: ArmError = RangeError::IndexOutOfRange { index: 7, len: 6 }.into();
        assert!(matches!(err, ArmError::Range(_)));
        assert!(err.to_string().contains("index 7"));
    }

    #[test]
    fn arm_error_from_empty_input() {
        let err: ArmError = EmptyInputError::EmptyChain.into();
        assert!(matches!(err, ArmError::EmptyInput(_)));
    }

    #[test]
    fn range_error_is_copy() {
        let err = RangeError::AngleCountMismatch { expected: 6, got: 2 };
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn configuration_error_display_messages() {
        assert_eq!(
            ConfigurationError::MultipleBaseJoints { count: 2 }.to_string(),
            "multiple base joints specified: 2"
        );
        assert_eq!(
            ConfigurationError::DisconnectedBase {
                base: "ShoulderBase".into()
            }
            .to_string(),
            "no linkage starts at base joint 'ShoulderBase'"
        );
        assert_eq!(
            ConfigurationError::IncompleteChain {
                joints_reached: 3,
                joints_total: 5,
                linkages_reached: 2,
                linkages_total: 3,
            }
            .to_string(),
            "incomplete chain: reached 3/5 joints and 2/3 linkages"
        );
        assert_eq!(
            ConfigurationError::EmptyAngleRange { min: 10, max: -10 }.to_string(),
            "empty angle range: 10 > -10"
        );
    }

    #[test]
    fn range_error_display_messages() {
        assert_eq!(
            RangeError::OutOfRangeAngle {
                joint: JointId(2),
                requested: 200,
                min: 0,
                max: 180,
            }
            .to_string(),
            "angle 200 for joint#2 outside [0, 180]"
        );
        assert_eq!(
            RangeError::UnknownJoint(JointId(9)).to_string(),
            "unknown joint#9"
        );
    }

    #[test]
    fn config_error_io_includes_path() {
        let e = ConfigError::Io {
            path: PathBuf::from("/tmp/arm.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/arm.toml"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn kinematics_error_flattens_into_arm_error() {
        let err: ArmError = KinematicsError::from(EmptyInputError::EmptyChain).into();
        assert!(matches!(err, ArmError::EmptyInput(EmptyInputError::EmptyChain)));

        let err: ArmError =
            KinematicsError::from(RangeError::IndexOutOfRange { index: 3, len: 2 }).into();
        assert!(matches!(err, ArmError::Range(_)));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<ArmError>();
    }
}
