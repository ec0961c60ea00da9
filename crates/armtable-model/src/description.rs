//! TOML arm description files.
//!
//! Every joint and linkage entry carries a `kind` discriminator so that new
//! variants can be added without guessing an element's type from its shape:
//!
//! ```toml
//! name = "two_link"
//!
//! [[joints]]
//! kind = "rotary"
//! name = "Base"
//! is_base = true
//!
//! [[joints]]
//! kind = "bend"
//! name = "Elbow"
//! min_angle = -45
//! max_angle = 225
//!
//! [[linkages]]
//! kind = "standard"
//! name = "Bicep"
//! start = "Base"
//! end = "Elbow"
//! length = 152.4
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use armtable_core::{ArmError, ConfigError, ConfigurationError, JointId};

use crate::types::{Arm, Joint, Linkage, LinkageKind, Orientation};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_arm_name() -> String {
    "arm".into()
}
const fn default_max_angle() -> i16 {
    360
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Fields shared by every joint variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFields {
    pub name: String,
    #[serde(default)]
    pub is_base: bool,
    #[serde(default)]
    pub angle: i16,
    #[serde(default)]
    pub min_angle: i16,
    #[serde(default = "default_max_angle")]
    pub max_angle: i16,
    /// Defaults to the starting angle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_angle: Option<i16>,
}

/// A joint entry, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JointSpec {
    Rotary(JointFields),
    Bend(JointFields),
}

impl JointSpec {
    pub const fn fields(&self) -> &JointFields {
        match self {
            Self::Rotary(f) | Self::Bend(f) => f,
        }
    }

    const fn orientation(&self) -> Orientation {
        match self {
            Self::Rotary(_) => Orientation::Rotate,
            Self::Bend(_) => Orientation::Bend,
        }
    }

    fn to_joint(&self) -> Joint {
        let f = self.fields();
        let joint = Joint::new(f.name.clone(), self.orientation())
            .with_limits(f.min_angle, f.max_angle)
            .with_angle(f.angle)
            .with_home(f.home_angle.unwrap_or(f.angle));
        if f.is_base {
            joint.base()
        } else {
            joint
        }
    }

    fn from_joint(joint: &Joint) -> Self {
        let fields = JointFields {
            name: joint.name().to_owned(),
            is_base: joint.is_base(),
            angle: joint.angle(),
            min_angle: joint.min_angle(),
            max_angle: joint.max_angle(),
            home_angle: Some(joint.home_angle()),
        };
        match joint.orientation() {
            Orientation::Rotate => Self::Rotary(fields),
            Orientation::Bend => Self::Bend(fields),
        }
    }
}

/// Fields of a straight linkage. Endpoints are joint names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageFields {
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub twist_degrees: f64,
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub reach: f64,
}

/// A linkage entry, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkageSpec {
    Standard(LinkageFields),
}

impl LinkageSpec {
    pub const fn fields(&self) -> &LinkageFields {
        match self {
            Self::Standard(f) => f,
        }
    }
}

// ---------------------------------------------------------------------------
// ArmDescription
// ---------------------------------------------------------------------------

/// Serializable form of an [`Arm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmDescription {
    #[serde(default = "default_arm_name")]
    pub name: String,
    #[serde(default)]
    pub joints: Vec<JointSpec>,
    #[serde(default)]
    pub linkages: Vec<LinkageSpec>,
}

impl ArmDescription {
    /// Describe an existing arm, using its current angles as starting angles.
    ///
    /// Linkage endpoints are written as joint names, so an arm whose linkages
    /// touch a duplicated name cannot be described and is rejected with
    /// [`ConfigurationError::AmbiguousJointName`].
    pub fn from_arm(arm: &Arm) -> Result<Self, ConfigurationError> {
        let joints = arm.joints();
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for joint in joints {
            *name_counts.entry(joint.name()).or_default() += 1;
        }
        let endpoint = |id: JointId| -> Result<String, ConfigurationError> {
            let name = joints[id.index()].name();
            if name_counts.get(name).copied().unwrap_or(0) > 1 {
                return Err(ConfigurationError::AmbiguousJointName(name.to_owned()));
            }
            Ok(name.to_owned())
        };

        let linkages = arm
            .linkages()
            .iter()
            .map(|l| match l.kind {
                LinkageKind::Standard => Ok(LinkageSpec::Standard(LinkageFields {
                    name: l.name.clone(),
                    start: endpoint(l.start)?,
                    end: endpoint(l.end)?,
                    length: l.length,
                    offset: l.offset,
                    twist_degrees: l.twist_degrees,
                    radius: l.radius,
                    width: l.width,
                    reach: l.reach,
                })),
            })
            .collect::<Result<_, ConfigurationError>>()?;

        Ok(Self {
            name: arm.name().to_owned(),
            joints: joints.iter().map(JointSpec::from_joint).collect(),
            linkages,
        })
    }

    /// Resolve joint names and build the arm.
    ///
    /// Duplicate joint names are allowed as long as no linkage refers to them.
    pub fn to_arm(&self) -> Result<Arm, ConfigurationError> {
        let mut by_name: HashMap<&str, Vec<JointId>> = HashMap::new();
        for (i, spec) in self.joints.iter().enumerate() {
            by_name
                .entry(spec.fields().name.as_str())
                .or_default()
                .push(JointId(i));
        }

        let resolve = |linkage: &str, joint: &str| -> Result<JointId, ConfigurationError> {
            match by_name.get(joint).map(Vec::as_slice) {
                Some([id]) => Ok(*id),
                Some(_) => Err(ConfigurationError::AmbiguousJointName(joint.to_owned())),
                None => Err(ConfigurationError::UnknownJoint {
                    linkage: linkage.to_owned(),
                    joint: joint.to_owned(),
                }),
            }
        };

        let mut linkages = Vec::with_capacity(self.linkages.len());
        for spec in &self.linkages {
            let f = spec.fields();
            let start = resolve(&f.name, &f.start)?;
            let end = resolve(&f.name, &f.end)?;
            let mut linkage = Linkage::new(f.name.clone(), start, end)
                .with_length(f.length)
                .with_offset(f.offset)
                .with_twist(f.twist_degrees);
            linkage.radius = f.radius;
            linkage.width = f.width;
            linkage.reach = f.reach;
            linkages.push(linkage);
        }

        let joints = self.joints.iter().map(JointSpec::to_joint).collect();
        let arm = Arm::new(self.name.clone(), joints, linkages)?;
        tracing::debug!(
            arm = %arm.name(),
            joints = arm.joint_count(),
            linkages = arm.linkage_count(),
            "arm description resolved"
        );
        Ok(arm)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse an arm description file from disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ArmDescription, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse an arm description from a TOML string.
pub fn parse_string(content: &str) -> Result<ArmDescription, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Parse a description file and build the arm it describes.
pub fn load_arm(path: impl AsRef<Path>) -> Result<Arm, ArmError> {
    Ok(parse_file(path)?.to_arm()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LINK: &str = r#"
        name = "two_link"

        [[joints]]
        kind = "rotary"
        name = "Base"
        is_base = true

        [[joints]]
        kind = "bend"
        name = "Elbow"
        angle = 90
        min_angle = -45
        max_angle = 225

        [[linkages]]
        kind = "standard"
        name = "Bicep"
        start = "Base"
        end = "Elbow"
        length = 152.4
        radius = 5
    "#;

    #[test]
    fn parse_two_link() {
        let desc = parse_string(TWO_LINK).unwrap();
        assert_eq!(desc.name, "two_link");
        assert_eq!(desc.joints.len(), 2);
        assert!(matches!(desc.joints[0], JointSpec::Rotary(_)));
        assert!(matches!(desc.joints[1], JointSpec::Bend(_)));
        assert_eq!(desc.joints[0].fields().max_angle, 360);
        assert!(desc.joints[0].fields().is_base);
    }

    #[test]
    fn to_arm_resolves_names() {
        let arm = parse_string(TWO_LINK).unwrap().to_arm().unwrap();
        assert_eq!(arm.joint_count(), 2);
        let bicep = &arm.linkages()[0];
        assert_eq!(bicep.start, JointId(0));
        assert_eq!(bicep.end, JointId(1));
        assert!((bicep.length - 152.4).abs() < f64::EPSILON);
        assert!((bicep.radius - 5.0).abs() < f64::EPSILON);

        let elbow = arm.joint(JointId(1)).unwrap();
        assert_eq!(elbow.orientation(), Orientation::Bend);
        assert_eq!(elbow.angle(), 90);
        // home defaults to the starting angle
        assert_eq!(elbow.home_angle(), 90);
    }

    #[test]
    fn missing_kind_is_rejected() {
        let toml_str = r#"
            [[joints]]
            name = "Base"
        "#;
        assert!(matches!(parse_string(toml_str), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let toml_str = r#"
            [[joints]]
            kind = "prismatic"
            name = "Slide"
        "#;
        assert!(parse_string(toml_str).is_err());
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let toml_str = r#"
            [[joints]]
            kind = "rotary"
            name = "Base"
            is_base = true

            [[linkages]]
            kind = "standard"
            name = "Dangling"
            start = "Base"
            end = "Nowhere"
        "#;
        let err = parse_string(toml_str).unwrap().to_arm().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownJoint {
                linkage: "Dangling".into(),
                joint: "Nowhere".into(),
            }
        );
    }

    #[test]
    fn referenced_duplicate_name_is_ambiguous() {
        let toml_str = r#"
            [[joints]]
            kind = "rotary"
            name = "J"
            is_base = true

            [[joints]]
            kind = "bend"
            name = "J"

            [[joints]]
            kind = "bend"
            name = "K"

            [[linkages]]
            kind = "standard"
            name = "JK"
            start = "J"
            end = "K"
        "#;
        let err = parse_string(toml_str).unwrap().to_arm().unwrap_err();
        assert_eq!(err, ConfigurationError::AmbiguousJointName("J".into()));
    }

    #[test]
    fn six_joint_arm_survives_description() {
        let arm = Arm::six_joint();
        let text = ArmDescription::from_arm(&arm)
            .unwrap()
            .to_toml_string()
            .unwrap();
        assert!(text.contains("kind = \"rotary\""));
        assert!(text.contains("kind = \"standard\""));

        let rebuilt = parse_string(&text).unwrap().to_arm().unwrap();
        assert_eq!(rebuilt, arm);
    }

    #[test]
    fn describing_referenced_duplicate_name_is_rejected() {
        let arm = Arm::new(
            "twins",
            vec![Joint::rotary("J").base(), Joint::bend("J"), Joint::bend("K")],
            vec![
                Linkage::new("first", JointId(0), JointId(1)),
                Linkage::new("second", JointId(1), JointId(2)),
            ],
        )
        .unwrap();
        assert_eq!(
            ArmDescription::from_arm(&arm).unwrap_err(),
            ConfigurationError::AmbiguousJointName("J".into())
        );
    }

    #[test]
    fn unreferenced_duplicate_name_still_describes() {
        let arm = Arm::new(
            "spare",
            vec![
                Joint::rotary("A").base(),
                Joint::bend("B"),
                Joint::bend("X"),
                Joint::bend("X"),
            ],
            vec![Linkage::new("AB", JointId(0), JointId(1))],
        )
        .unwrap();
        let desc = ArmDescription::from_arm(&arm).unwrap();
        assert_eq!(desc.joints.len(), 4);
        assert_eq!(desc.to_arm().unwrap(), arm);
    }

    #[test]
    fn load_arm_missing_file() {
        let err = load_arm("/nonexistent/armtable/arm.toml").unwrap_err();
        assert!(matches!(err, ArmError::Config(ConfigError::Io { .. })));
    }
}
