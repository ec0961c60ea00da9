use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Grid size, in linear units, that workspace coordinates are rounded to.
///
/// Coordinates closer than half a step along every axis share a lookup key.
pub const DEFAULT_RESOLUTION: f64 = 0.1;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_step_degrees() -> u16 {
    1
}
const fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}
const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

/// Settings for the workspace sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Lower bound of the global sweep range. Derived from the joints when unset.
    #[serde(default)]
    pub min_angle: Option<i16>,

    /// Upper bound of the global sweep range. Derived from the joints when unset.
    #[serde(default)]
    pub max_angle: Option<i16>,

    /// Angle increment between samples, in degrees (default: 1).
    #[serde(default = "default_step_degrees")]
    pub step_degrees: u16,

    /// Quantization grid for lookup keys (default: [`DEFAULT_RESOLUTION`]).
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            min_angle: None,
            max_angle: None,
            step_degrees: default_step_degrees(),
            resolution: default_resolution(),
        }
    }
}

impl WorkspaceConfig {
    /// Sweep a fixed `[min, max]` range instead of the joint-derived one.
    #[must_use]
    pub const fn with_range(mut self, min: i16, max: i16) -> Self {
        self.min_angle = Some(min);
        self.max_angle = Some(max);
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub const fn with_step(mut self, step_degrees: u16) -> Self {
        self.step_degrees = step_degrees;
        self
    }

    /// Validate configuration. Returns Err on invalid values.
    ///
    /// An inverted `min_angle`/`max_angle` pair is left to the enumerator,
    /// which reports it as an empty angle range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "workspace.resolution".into(),
                message: format!("{} (must be > 0)", self.resolution),
            });
        }
        if self.step_degrees == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workspace.step_degrees".into(),
                message: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Notification and startup behaviour of the arm controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Fire an "arm moved" notification after every accepted turn.
    #[serde(default = "default_true")]
    pub emit_moved_on_turn: bool,

    /// Move every joint to its home angle right after initialization.
    #[serde(default)]
    pub start_at_home: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            emit_moved_on_turn: true,
            start_at_home: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for one arm session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Arm description file. The built-in 6-joint arm is used when unset.
    #[serde(default)]
    pub arm_path: Option<PathBuf>,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub controller: ControllerConfig,
}

impl SessionConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workspace.validate()
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    ///
    /// A relative `arm_path` is resolved against the config file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let (Some(arm_path), Some(dir)) = (config.arm_path.as_mut(), path.parent()) {
            if arm_path.is_relative() {
                *arm_path = dir.join(&*arm_path);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let cfg = SessionConfig::default();
        assert!(cfg.arm_path.is_none());
        assert_eq!(cfg.workspace.step_degrees, 1);
        assert!((cfg.workspace.resolution - DEFAULT_RESOLUTION).abs() < f64::EPSILON);
        assert!(cfg.controller.emit_moved_on_turn);
        assert!(!cfg.controller.start_at_home);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn session_config_from_empty_toml_uses_defaults() {
        let cfg = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SessionConfig::default());
    }

    #[test]
    fn session_config_from_toml() {
        let toml_str = r#"
            arm_path = "arms/six_joint.toml"

            [workspace]
            min_angle = 0
            max_angle = 90
            resolution = 0.5

            [controller]
            emit_moved_on_turn = false
            start_at_home = true
        "#;
        let cfg = SessionConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(cfg.arm_path, Some(PathBuf::from("arms/six_joint.toml")));
        assert_eq!(cfg.workspace.min_angle, Some(0));
        assert_eq!(cfg.workspace.max_angle, Some(90));
        assert_eq!(cfg.workspace.step_degrees, 1);
        assert!((cfg.workspace.resolution - 0.5).abs() < f64::EPSILON);
        assert!(!cfg.controller.emit_moved_on_turn);
        assert!(cfg.controller.start_at_home);
    }

    #[test]
    fn workspace_config_rejects_non_positive_resolution() {
        let cfg = WorkspaceConfig::default().with_resolution(0.0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("workspace.resolution"));

        let cfg = WorkspaceConfig::default().with_resolution(f64::NAN);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn workspace_config_rejects_zero_step() {
        let cfg = WorkspaceConfig::default().with_step(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn workspace_config_inverted_range_is_left_to_enumerator() {
        let cfg = WorkspaceConfig::default().with_range(90, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn session_config_invalid_toml_is_error() {
        let err = SessionConfig::from_toml_str("workspace = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn session_config_from_missing_file_is_io_error() {
        let err = SessionConfig::from_file("/nonexistent/armtable/session.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
