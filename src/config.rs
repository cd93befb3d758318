// Timing, deadband, serial and topic configuration
use std::time::Duration;

use clap::Parser;

use crate::commutator::RotationAxis;

// Control loop period (10 Hz)
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

// Minimum |turn| that is worth sending; smaller changes are sensor jitter
pub const DEADBAND_TURNS: f64 = 0.01;

// Allowed deviation of the rotation axis length from 1
pub const AXIS_EPSILON: f64 = 1e-6;

// Motor controller serial link
pub const DEFAULT_BAUD_RATE: u32 = 9600;
// A write that cannot complete in this time is dropped
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

// Operator jog step, per button press
pub const JOG_STEP_TURNS: f64 = 0.1;

// How often the runtime drains incoming zenoh samples
pub const INGEST_HZ: u64 = 100;
// Status publishing rate
pub const STATUS_HZ: u64 = 5;

// Zenoh topics
pub const TOPIC_ORIENTATION: &str = "commutator/sensor/orientation"; // quaternion samples
pub const TOPIC_JOG: &str = "commutator/cmd/jog"; // manual turns
pub const TOPIC_LIFECYCLE: &str = "commutator/cmd/lifecycle"; // start / stop
pub const TOPIC_STATUS: &str = "commutator/state/status"; // controller status

/// Command-line settings for the runtime binary
#[derive(Debug, Clone, Parser)]
#[command(name = "commutator-zenoh-runtime", about = "Drives a cable commutator from orientation samples")]
pub struct Settings {
    /// Serial port of the commutator motor controller
    #[arg(short, long, default_value = "")]
    pub port: String,

    /// Rotation axis: yaw, pitch, roll (prefix '-' to invert), or x,y,z
    #[arg(short, long, default_value = "yaw", allow_hyphen_values = true)]
    pub axis: RotationAxis,

    /// Topic carrying orientation samples
    #[arg(long, default_value = TOPIC_ORIENTATION)]
    pub orientation_topic: String,

    /// Start the control loop immediately instead of waiting for a start command
    #[arg(long)]
    pub autostart: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let s = Settings::parse_from(["commutator-zenoh-runtime"]);
        assert_eq!(s.port, "");
        assert_eq!(s.axis, RotationAxis::Z);
        assert_eq!(s.orientation_topic, TOPIC_ORIENTATION);
        assert!(!s.autostart);
    }

    #[test]
    fn test_settings_inverted_axis() {
        let s = Settings::parse_from([
            "commutator-zenoh-runtime",
            "--port",
            "/dev/ttyACM0",
            "--axis",
            "-roll",
            "--autostart",
        ]);
        assert_eq!(s.port, "/dev/ttyACM0");
        assert_eq!(s.axis, RotationAxis::X.inverted());
        assert!(s.autostart);
    }
}
