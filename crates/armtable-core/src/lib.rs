// armtable-core: identifiers, errors and configuration shared by the arm table crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ControllerConfig, SessionConfig, WorkspaceConfig, DEFAULT_RESOLUTION};
pub use error::{
    ArmError, ConfigError, ConfigurationError, EmptyInputError, KinematicsError, RangeError,
};
pub use types::{JointId, LinkageId};
