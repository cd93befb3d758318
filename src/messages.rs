// Message types exchanged over zenoh

use serde::{Deserialize, Serialize};

use crate::commutator::{ControllerState, Quaternion};

// Orientation sample from the sensor stream -> runtime
// Component order is (w, x, y, z)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrientationSample {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<&OrientationSample> for Quaternion {
    fn from(s: &OrientationSample) -> Self {
        Quaternion::new(s.w, s.x, s.y, s.z)
    }
}

impl From<Quaternion> for OrientationSample {
    fn from(q: Quaternion) -> Self {
        Self {
            w: q.w,
            x: q.x,
            y: q.y,
            z: q.z,
        }
    }
}

// Operator jog, in turns; sent to the motor as-is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JogCommand {
    pub turn: f64,
}

/// Host acquisition lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    Start,
    Stop,
}

/// Status published by runtime
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommutatorStatus {
    pub state: ControllerState,
    pub port: Option<String>,
    /// Twist angle of the latest processed sample, radians
    pub angle_about_axis: Option<f64>,
    pub last_sent_turn: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_sample_json() {
        let s: OrientationSample =
            serde_json::from_str(r#"{"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0}"#).unwrap();
        assert_eq!(Quaternion::from(&s), Quaternion::IDENTITY);
    }

    #[test]
    fn test_lifecycle_json() {
        assert_eq!(
            serde_json::from_str::<LifecycleCommand>(r#""start""#).unwrap(),
            LifecycleCommand::Start
        );
        assert_eq!(serde_json::to_string(&LifecycleCommand::Stop).unwrap(), r#""stop""#);
    }

    #[test]
    fn test_status_json() {
        let status = CommutatorStatus {
            state: ControllerState::Armed,
            port: Some("/dev/ttyACM0".to_string()),
            angle_about_axis: None,
            last_sent_turn: Some(-0.25),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "armed");
        assert_eq!(json["last_sent_turn"], -0.25);
        assert!(json["angle_about_axis"].is_null());
    }
}
