// Twist extraction: how far the subject has turned about the commutator axis
//
// A rotation is split into a swing (tilting the axis itself) and a twist (pure
// rotation about the axis). Only the twist drives the motor. Successive twist
// angles are unwrapped modulo 2*pi so a small physical rotation across the
// +/-pi seam never reads as a near full turn.

use std::f64::consts::{PI, TAU};

use super::axis::RotationAxis;
use super::quaternion::Quaternion;

/// Result of comparing one orientation against the run's baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    /// Signed increment in fractional turns (1.0 = 360 deg).
    /// Inverted: a positive rotation about the axis yields a negative turn command.
    pub turns: f64,
    /// Twist angle of this sample about the axis, radians in [0, 2*pi)
    pub angle: f64,
}

/// Angle of the twist component of `q` about `axis`, in [0, 2*pi)
///
/// Returns `None` when there is nothing to measure: `q` is not a usable
/// orientation (sentinel, non-finite), `axis` has no direction, or `q` swings
/// the axis by exactly 180 deg so the twist about it is undefined.
pub fn angle_about_axis(q: &Quaternion, axis: &RotationAxis) -> Option<f64> {
    let length = axis.length();
    if !(length.is_finite() && length > 0.0) {
        return None;
    }

    let q = q.normalized()?;
    let a = axis.vector().scale(1.0 / length);

    let along = q.vector().dot(&a);
    let projection = a.scale(along);
    let twist = Quaternion::new(q.w, projection.x, projection.y, projection.z);

    // Swing of exactly 180 deg leaves no twist component to measure
    let twist = twist.normalized()?;

    // q and -q are the same rotation; force the vector part to point along the axis
    let twist = if along < 0.0 { twist.negated() } else { twist };

    // w = -1 (e.g. -identity) is the zero twist, not 2*pi
    Some((2.0 * twist.w.clamp(-1.0, 1.0).acos()).rem_euclid(TAU))
}

/// Shortest signed angle from `previous` to `current`, in [-pi, pi)
pub fn unwrap_delta(current: f64, previous: f64) -> f64 {
    (current - previous + 3.0 * PI).rem_euclid(TAU) - PI
}

/// Twist of `current` relative to `previous_angle`
///
/// Without a previous angle (first sample of a run) the sample only anchors the
/// baseline: the returned `turns` is zero.
pub fn twist_from_swing_twist(
    current: &Quaternion,
    axis: &RotationAxis,
    previous_angle: Option<f64>,
) -> Option<Twist> {
    let angle = angle_about_axis(current, axis)?;
    let turns = match previous_angle {
        Some(previous) => -unwrap_delta(angle, previous) / TAU,
        None => 0.0,
    };
    Some(Twist { turns, angle })
}
