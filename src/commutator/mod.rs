// Commutator core
//
// Provides:
// - Quaternion math and swing-twist extraction about a configured axis
// - The `{turn: ...}` serial line format and a lock-guarded serial transport
// - A latest-sample mailbox for the orientation producer
// - The periodic, deadband-gated control loop

mod axis;
mod codec;
mod controller;
mod publisher;
mod quaternion;
pub mod scheduler;
pub mod transport;
pub mod twist;

pub use axis::{AxisError, AxisSelection, EulerAngle, RotationAxis};
pub use codec::{TURN_PRECISION, encode_turn};
pub use controller::{Commutator, ControllerState};
pub use publisher::OrientationPublisher;
pub use quaternion::{Quaternion, Vector3};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use transport::{Connector, SerialPortConnector, SerialTransport, TransportError};
pub use twist::{Twist, twist_from_swing_twist};
