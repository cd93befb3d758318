// Rotation axis configuration
//
// The commutator un-twists about a single fixed axis in the sensor frame.
// Operators normally pick one of six presets (yaw/pitch/roll, either polarity);
// an explicit vector is also accepted.

use std::fmt;
use std::str::FromStr;

use super::quaternion::Vector3;
use crate::config::AXIS_EPSILON;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AxisError {
    #[error("Unknown axis preset: {0:?}")]
    UnknownPreset(String),

    #[error("Invalid axis component {component:?}: expected a number")]
    InvalidComponent { component: String },

    #[error("Axis vector needs 3 components, got {0}")]
    WrongArity(usize),
}

/// Unit vector the twist is measured about
///
/// Length is validated by the controller's readiness check, not at construction,
/// so a misconfigured axis is reported instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAxis(Vector3);

impl RotationAxis {
    pub const X: RotationAxis = RotationAxis(Vector3::new(1.0, 0.0, 0.0));
    pub const Y: RotationAxis = RotationAxis(Vector3::new(0.0, 1.0, 0.0));
    pub const Z: RotationAxis = RotationAxis(Vector3::new(0.0, 0.0, 1.0));

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn vector(&self) -> Vector3 {
        self.0
    }

    pub fn length(&self) -> f64 {
        self.0.norm()
    }

    /// True when the length is within `AXIS_EPSILON` of 1
    pub fn is_unit(&self) -> bool {
        self.0.is_finite() && (self.length() - 1.0).abs() <= AXIS_EPSILON
    }

    pub fn inverted(&self) -> RotationAxis {
        RotationAxis(self.0.scale(-1.0))
    }
}

impl Default for RotationAxis {
    fn default() -> Self {
        AxisSelection::default().axis()
    }
}

impl fmt::Display for RotationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

/// Accepts a preset (`yaw`, `-pitch`, `+x`, ...) or an explicit `x,y,z` vector
impl FromStr for RotationAxis {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(AxisError::WrongArity(parts.len()));
            }
            let mut v = [0.0f64; 3];
            for (slot, part) in v.iter_mut().zip(&parts) {
                *slot = part.parse().map_err(|_| AxisError::InvalidComponent {
                    component: (*part).to_string(),
                })?;
            }
            return Ok(RotationAxis::new(v[0], v[1], v[2]));
        }
        s.parse::<AxisSelection>().map(|sel| sel.axis())
    }
}

/// Euler-style angle the operator wants to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EulerAngle {
    /// Heading, about Z
    #[default]
    Yaw,
    /// About Y
    Pitch,
    /// About X
    Roll,
}

/// One of the six axis presets: an angle plus polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSelection {
    pub angle: EulerAngle,
    pub inverted: bool,
}

impl AxisSelection {
    pub const fn new(angle: EulerAngle, inverted: bool) -> Self {
        Self { angle, inverted }
    }

    pub fn axis(&self) -> RotationAxis {
        let axis = match self.angle {
            EulerAngle::Yaw => RotationAxis::Z,
            EulerAngle::Pitch => RotationAxis::Y,
            EulerAngle::Roll => RotationAxis::X,
        };
        if self.inverted { axis.inverted() } else { axis }
    }
}

impl FromStr for AxisSelection {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (inverted, name) = match lower.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, lower.strip_prefix('+').unwrap_or(&lower)),
        };
        let angle = match name {
            "yaw" | "heading" | "z" => EulerAngle::Yaw,
            "pitch" | "y" => EulerAngle::Pitch,
            "roll" | "x" => EulerAngle::Roll,
            _ => return Err(AxisError::UnknownPreset(s.to_string())),
        };
        Ok(AxisSelection::new(angle, inverted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_map_to_unit_axes() {
        assert_eq!("yaw".parse::<RotationAxis>().unwrap(), RotationAxis::Z);
        assert_eq!("pitch".parse::<RotationAxis>().unwrap(), RotationAxis::Y);
        assert_eq!("roll".parse::<RotationAxis>().unwrap(), RotationAxis::X);
        assert_eq!(
            "-yaw".parse::<RotationAxis>().unwrap(),
            RotationAxis::new(-0.0, -0.0, -1.0)
        );
        assert_eq!("+X".parse::<RotationAxis>().unwrap(), RotationAxis::X);
    }

    #[test]
    fn test_explicit_vector() {
        let axis: RotationAxis = "0, 0.6, 0.8".parse().unwrap();
        assert!(axis.is_unit());
        let axis: RotationAxis = "0,0,2".parse().unwrap();
        assert!(!axis.is_unit());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "spin".parse::<RotationAxis>(),
            Err(AxisError::UnknownPreset("spin".to_string()))
        );
        assert_eq!("1,0".parse::<RotationAxis>(), Err(AxisError::WrongArity(2)));
        assert!(matches!(
            "1,a,0".parse::<RotationAxis>(),
            Err(AxisError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_unit_length_check() {
        assert!(RotationAxis::Z.is_unit());
        assert!(!RotationAxis::new(0.0, 0.0, 0.0).is_unit());
        assert!(!RotationAxis::new(0.0, 0.0, 1.001).is_unit());
        assert!(RotationAxis::new(0.0, 0.0, 1.0 + 1e-9).is_unit());
        assert!(!RotationAxis::new(f64::NAN, 0.0, 1.0).is_unit());
    }

    #[test]
    fn test_default_is_yaw() {
        assert_eq!(RotationAxis::default(), RotationAxis::Z);
    }
}
