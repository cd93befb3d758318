// Synthetic orientation stream: a subject spinning about Z with a wobble.
// Stands in for the IMU acquisition host when bench-testing the commutator.
//
// Usage: cargo run --example orientation_source -- [turns_per_second]

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::info;

use commutator_zenoh_runtime::commutator::{Quaternion, Vector3};
use commutator_zenoh_runtime::config::TOPIC_ORIENTATION;
use commutator_zenoh_runtime::messages::OrientationSample;

// Sample rate of the simulated sensor
const SAMPLE_HZ: u64 = 100;
// Off-axis tilt, radians; must not show up as twist
const WOBBLE: f64 = 0.3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let turns_per_second: f64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0.2,
    };

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_ORIENTATION).await?;

    info!(
        "Publishing {} Hz orientation on {}: {} turn/s about Z",
        SAMPLE_HZ, TOPIC_ORIENTATION, turns_per_second
    );

    let start = Instant::now();
    let mut tick = interval(Duration::from_millis(1000 / SAMPLE_HZ));
    loop {
        tick.tick().await;
        let t = start.elapsed().as_secs_f64();

        let heading = Quaternion::from_axis_angle(Vector3::new(0.0, 0.0, 1.0), TAU * turns_per_second * t);
        let tilt_axis = Vector3::new((0.7 * t).cos(), (0.7 * t).sin(), 0.0);
        let tilt = Quaternion::from_axis_angle(tilt_axis, WOBBLE * (1.3 * t).sin());

        let sample = OrientationSample::from(tilt * heading);
        publisher.put(serde_json::to_string(&sample)?).await?;
    }
}
