// Zenoh host for the commutator
//
// Feeds the core from the network the way an acquisition host would:
// orientation samples -> publisher, jog commands -> manual_turn,
// lifecycle commands -> start/stop. Publishes controller status.

use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::commutator::{
    Commutator, OrientationPublisher, Quaternion, Scheduler, SerialTransport, TokioScheduler,
};
use crate::config::{INGEST_HZ, STATUS_HZ, Settings, TOPIC_JOG, TOPIC_LIFECYCLE, TOPIC_STATUS};
use crate::messages::{JogCommand, LifecycleCommand, OrientationSample};

pub struct Runtime<S: Scheduler> {
    commutator: Commutator<S>,
    orientation: OrientationPublisher,
}

impl<S: Scheduler> Runtime<S> {
    pub fn new(commutator: Commutator<S>) -> Self {
        let orientation = commutator.publisher();
        Self {
            commutator,
            orientation,
        }
    }

    /// Apply settings and optionally start the loop
    pub fn configure(&self, settings: &Settings) {
        self.commutator.configure_axis(settings.axis);
        self.commutator.configure_serial_port(&settings.port);
        if settings.autostart && !self.commutator.start() {
            warn!("Autostart failed, waiting for a start command");
        }
    }

    pub fn commutator(&self) -> &Commutator<S> {
        &self.commutator
    }

    /// Process an orientation payload
    fn on_orientation(&self, payload: &[u8]) {
        match serde_json::from_slice::<OrientationSample>(payload) {
            Ok(sample) => self.orientation.publish(Quaternion::from(&sample)),
            Err(e) => warn!("Failed to parse orientation sample: {}", e),
        }
    }

    /// Process a jog payload
    fn on_jog(&self, payload: &[u8]) {
        match serde_json::from_slice::<JogCommand>(payload) {
            Ok(cmd) => {
                self.commutator.manual_turn(cmd.turn);
            }
            Err(e) => warn!("Failed to parse jog command: {}", e),
        }
    }

    /// Process a lifecycle payload
    fn on_lifecycle(&self, payload: &[u8]) {
        match serde_json::from_slice::<LifecycleCommand>(payload) {
            Ok(LifecycleCommand::Start) => {
                if !self.commutator.start() {
                    warn!("Start refused: commutator not ready");
                }
            }
            Ok(LifecycleCommand::Stop) => self.commutator.stop(),
            Err(e) => warn!("Failed to parse lifecycle command: {}", e),
        }
    }

    fn status_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.commutator.status())
    }
}

pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_orientation = session
        .declare_subscriber(settings.orientation_topic.as_str())
        .await?;
    let sub_jog = session.declare_subscriber(TOPIC_JOG).await?;
    let sub_lifecycle = session.declare_subscriber(TOPIC_LIFECYCLE).await?;
    let pub_status = session.declare_publisher(TOPIC_STATUS).await?;

    let scheduler = TokioScheduler::new(tokio::runtime::Handle::current());
    let runtime = Runtime::new(Commutator::new(SerialTransport::serial(), scheduler));
    runtime.configure(&settings);

    let mut ingest = interval(Duration::from_millis(1000 / INGEST_HZ));
    let mut status = interval(Duration::from_millis(1000 / STATUS_HZ));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Subscribed to: {}, {}, {}", settings.orientation_topic, TOPIC_JOG, TOPIC_LIFECYCLE);
    info!("Publishing to: {}", TOPIC_STATUS);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = ingest.tick() => {
                // 1. Drain orientation samples; only the newest survives to the next tick
                while let Ok(Some(sample)) = sub_orientation.try_recv() {
                    runtime.on_orientation(&sample.payload().to_bytes());
                }

                // 2. Operator commands
                while let Ok(Some(sample)) = sub_jog.try_recv() {
                    runtime.on_jog(&sample.payload().to_bytes());
                }
                while let Ok(Some(sample)) = sub_lifecycle.try_recv() {
                    runtime.on_lifecycle(&sample.payload().to_bytes());
                }
            }
            _ = status.tick() => {
                let status_json = runtime.status_json()?;
                debug!("Status: {}", status_json);
                pub_status.put(status_json).await?;
            }
        }
    }

    runtime.commutator().stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutator::transport::testing::FakeDevice;
    use crate::commutator::{ControllerState, ManualScheduler, RotationAxis};
    use clap::Parser;

    fn runtime() -> (Runtime<ManualScheduler>, ManualScheduler, FakeDevice) {
        let device = FakeDevice::new();
        let scheduler = ManualScheduler::new();
        let runtime = Runtime::new(Commutator::new(
            SerialTransport::new(device.connector()),
            scheduler.clone(),
        ));
        (runtime, scheduler, device)
    }

    #[test]
    fn test_configure_with_autostart() {
        let (runtime, scheduler, _) = runtime();
        let settings = Settings::parse_from([
            "rt",
            "--port",
            "/dev/ttyACM0",
            "--axis",
            "pitch",
            "--autostart",
        ]);
        runtime.configure(&settings);
        assert_eq!(runtime.commutator().axis(), RotationAxis::Y);
        assert_eq!(runtime.commutator().state(), ControllerState::Running);
        assert!(scheduler.is_scheduled());
    }

    #[test]
    fn test_configure_without_port_stays_unconfigured() {
        let (runtime, scheduler, _) = runtime();
        runtime.configure(&Settings::parse_from(["rt", "--autostart"]));
        assert_eq!(runtime.commutator().state(), ControllerState::Unconfigured);
        assert!(!scheduler.is_scheduled());
    }

    #[test]
    fn test_payloads_drive_the_loop() {
        let (runtime, scheduler, device) = runtime();
        runtime.configure(&Settings::parse_from(["rt", "--port", "/dev/ttyACM0"]));

        runtime.on_lifecycle(br#""start""#);
        assert_eq!(runtime.commutator().state(), ControllerState::Running);

        runtime.on_orientation(br#"{"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0}"#);
        scheduler.fire();
        let half = std::f64::consts::FRAC_1_SQRT_2;
        runtime.on_orientation(format!(r#"{{"w": {half}, "x": 0.0, "y": 0.0, "z": {half}}}"#).as_bytes());
        scheduler.fire();
        assert_eq!(device.lines(), vec!["{turn: -0.25000}\r\n".to_string()]);

        runtime.on_lifecycle(br#""stop""#);
        assert_eq!(runtime.commutator().state(), ControllerState::Armed);
    }

    #[test]
    fn test_jog_and_bad_payloads() {
        let (runtime, _, device) = runtime();
        runtime.configure(&Settings::parse_from(["rt", "--port", "/dev/ttyACM0"]));
        runtime.on_jog(br#"{"turn": 0.1}"#);
        runtime.on_jog(b"not json");
        runtime.on_orientation(b"{}");
        runtime.on_lifecycle(br#""pause""#);
        assert_eq!(device.lines(), vec!["{turn: 0.10000}\r\n".to_string()]);
    }

    #[test]
    fn test_status_json() {
        let (runtime, _, _) = runtime();
        runtime.configure(&Settings::parse_from(["rt", "--port", "/dev/ttyACM0"]));
        let json: serde_json::Value = serde_json::from_str(&runtime.status_json().unwrap()).unwrap();
        assert_eq!(json["state"], "armed");
        assert_eq!(json["port"], "/dev/ttyACM0");
    }
}
