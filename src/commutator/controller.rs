// Commutator control loop
//
// Every TICK_PERIOD the loop reads the newest orientation, measures the twist
// about the configured axis relative to the run's baseline, and sends a turn
// command when the twist leaves the deadband. The baseline only advances when a
// command actually goes out, so slow rotations accumulate until they are worth
// sending and a dropped write is re-sent on the next tick.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::axis::RotationAxis;
use super::codec::encode_turn;
use super::publisher::{OrientationPublisher, OrientationSlot};
use super::scheduler::Scheduler;
use super::transport::{self, SerialTransport};
use super::twist::twist_from_swing_twist;
use crate::config::{DEADBAND_TURNS, TICK_PERIOD};
use crate::messages::CommutatorStatus;

/// Lifecycle of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Port closed or axis not unit length
    Unconfigured,
    /// Ready to start
    Armed,
    /// Ticking
    Running,
}

/// Per-run twist memory, reset on every start
#[derive(Debug, Clone, Copy, Default)]
struct TwistBaseline {
    previous_angle: Option<f64>,
    last_sent: Option<f64>,
}

#[derive(Debug)]
struct LoopState {
    axis: RotationAxis,
    running: bool,
    /// Bumped on every start so a tick can tell its run apart from a later one
    run: u64,
    baseline: TwistBaseline,
    last_angle: Option<f64>,
}

/// State reachable from the tick task
struct Shared {
    transport: SerialTransport,
    slot: OrientationSlot,
    state: Mutex<LoopState>,
}

impl Shared {
    fn send_turn(&self, turn: f64) -> transport::Result<()> {
        self.transport.write(&encode_turn(turn)).map(|_| ())
    }

    /// One control step; never holds the loop-state lock across the device write
    fn tick(&self) {
        let (run, twist) = {
            let mut state = self.state.lock();
            if !state.running {
                return;
            }

            let Some(current) = self.slot.latest() else {
                trace!("No orientation sample yet");
                return;
            };

            let previous = state.baseline.previous_angle;
            let Some(twist) = twist_from_swing_twist(&current, &state.axis, previous) else {
                trace!("No twist measurable from {:?}", current);
                return;
            };
            state.last_angle = Some(twist.angle);

            if previous.is_none() {
                debug!("Anchored twist baseline at {:.4} rad", twist.angle);
                state.baseline.previous_angle = Some(twist.angle);
                return;
            }

            if !exceeds_deadband(twist.turns) {
                trace!("Twist {:.5} within deadband", twist.turns);
                return;
            }
            (state.run, twist)
        };

        if let Err(e) = self.send_turn(twist.turns) {
            warn!("Dropped turn {:.5}: {}", twist.turns, e);
            return;
        }
        debug!("Sent turn {:.5}", twist.turns);

        // stop() or a restart during the write owns the baseline now
        let mut state = self.state.lock();
        if state.running && state.run == run {
            state.baseline.previous_angle = Some(twist.angle);
            state.baseline.last_sent = Some(twist.turns);
        }
    }
}

/// Strictly outside the deadband: a twist of exactly `DEADBAND_TURNS` is not sent
fn exceeds_deadband(turns: f64) -> bool {
    turns.abs() > DEADBAND_TURNS
}

/// Drives the commutator motor from published orientations
pub struct Commutator<S: Scheduler> {
    shared: Arc<Shared>,
    scheduler: S,
    tick_handle: Mutex<Option<S::Handle>>,
}

impl<S: Scheduler> Commutator<S> {
    pub fn new(transport: SerialTransport, scheduler: S) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                slot: OrientationSlot::default(),
                state: Mutex::new(LoopState {
                    axis: RotationAxis::default(),
                    running: false,
                    run: 0,
                    baseline: TwistBaseline::default(),
                    last_angle: None,
                }),
            }),
            scheduler,
            tick_handle: Mutex::new(None),
        }
    }

    /// Handle for the orientation producer
    pub fn publisher(&self) -> OrientationPublisher {
        OrientationPublisher::new(self.shared.slot.clone())
    }

    pub fn axis(&self) -> RotationAxis {
        self.shared.state.lock().axis
    }

    /// Set the rotation axis; ignored while running
    pub fn configure_axis(&self, axis: RotationAxis) -> bool {
        let mut state = self.shared.state.lock();
        if state.running {
            debug!("Ignoring axis change to {} while running", axis);
            return false;
        }
        info!("Rotation axis set to {}", axis);
        state.axis = axis;
        true
    }

    /// Open (or reopen) the motor serial port; an empty name is a no-op
    pub fn configure_serial_port(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!("No serial port selected");
            return false;
        }
        self.shared.transport.open(name)
    }

    /// Port open and axis unit length; logs each failing condition
    pub fn is_ready(&self) -> bool {
        let axis = self.axis();
        let port_open = self.shared.transport.is_open();
        if !port_open {
            warn!("Commutator not ready: serial port is not open");
        }
        let axis_ok = axis.is_unit();
        if !axis_ok {
            warn!(
                "Commutator not ready: rotation axis {} has length {:.6}, expected 1",
                axis,
                axis.length()
            );
        }
        port_open && axis_ok
    }

    pub fn state(&self) -> ControllerState {
        let state = self.shared.state.lock();
        if state.running {
            ControllerState::Running
        } else if self.shared.transport.is_open() && state.axis.is_unit() {
            ControllerState::Armed
        } else {
            ControllerState::Unconfigured
        }
    }

    /// Reset the run and begin ticking if ready
    pub fn start(&self) -> bool {
        let mut handle = self.tick_handle.lock();
        if let Some(previous) = handle.take() {
            debug!("Restarting control loop");
            self.scheduler.cancel(previous);
        }

        {
            let mut state = self.shared.state.lock();
            state.running = false;
            state.baseline = TwistBaseline::default();
            state.last_angle = None;
        }
        self.shared.slot.reset();

        if !self.is_ready() {
            return false;
        }

        {
            let mut state = self.shared.state.lock();
            state.running = true;
            state.run += 1;
        }
        let shared = Arc::clone(&self.shared);
        *handle = Some(
            self.scheduler
                .schedule(TICK_PERIOD, Box::new(move || shared.tick())),
        );
        info!(
            "Commutator running: {}ms tick, {} turn deadband, axis {}",
            TICK_PERIOD.as_millis(),
            DEADBAND_TURNS,
            self.axis()
        );
        true
    }

    /// Stop ticking; no tick begins or moves the baseline after this returns
    ///
    /// A write already in flight is not waited for.
    pub fn stop(&self) {
        let mut handle = self.tick_handle.lock();
        if let Some(h) = handle.take() {
            self.scheduler.cancel(h);
        }
        let mut state = self.shared.state.lock();
        if state.running {
            state.running = false;
            info!("Commutator stopped");
        }
    }

    /// Send `turn` straight to the motor, bypassing deadband and baseline
    pub fn manual_turn(&self, turn: f64) -> bool {
        if !turn.is_finite() {
            warn!("Rejecting non-finite manual turn {}", turn);
            return false;
        }
        if !self.shared.transport.is_open() {
            warn!("Manual turn {:.5} ignored: serial port is not open", turn);
            return false;
        }
        match self.shared.send_turn(turn) {
            Ok(()) => {
                info!("Manual turn {:.5}", turn);
                true
            }
            Err(e) => {
                warn!("Manual turn {:.5} failed: {}", turn, e);
                false
            }
        }
    }

    pub fn status(&self) -> CommutatorStatus {
        let controller = self.state();
        let state = self.shared.state.lock();
        CommutatorStatus {
            state: controller,
            port: self.shared.transport.port_name(),
            angle_about_axis: state.last_angle,
            last_sent_turn: state.baseline.last_sent,
        }
    }
}

impl<S: Scheduler> Drop for Commutator<S> {
    fn drop(&mut self) {
        self.stop();
        self.shared.transport.close();
    }
}
