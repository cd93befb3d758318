// Latest-orientation mailbox between the sample producer and the control loop
//
// One slot, overwritten whole on each publish and read whole on each tick.
// Intermediate samples between ticks are dropped on purpose.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::quaternion::Quaternion;

/// Shared single-sample slot; holds `Quaternion::SENTINEL` until a sample arrives
#[derive(Debug, Clone, Default)]
pub(crate) struct OrientationSlot(Arc<Mutex<Quaternion>>);

impl OrientationSlot {
    pub(crate) fn store(&self, q: Quaternion) {
        *self.0.lock() = q;
    }

    pub(crate) fn reset(&self) {
        self.store(Quaternion::SENTINEL);
    }

    /// Most recent sample, or `None` while only the sentinel has been seen
    pub(crate) fn latest(&self) -> Option<Quaternion> {
        let q = *self.0.lock();
        if q.is_sentinel() { None } else { Some(q) }
    }
}

/// Write side handed to the orientation producer
///
/// Cheap to clone; publishing never waits on the control loop beyond a copy.
#[derive(Debug, Clone)]
pub struct OrientationPublisher {
    slot: OrientationSlot,
}

impl OrientationPublisher {
    pub(crate) fn new(slot: OrientationSlot) -> Self {
        Self { slot }
    }

    /// Replace the latest orientation
    ///
    /// Non-finite samples are dropped so they never reach the control loop.
    pub fn publish(&self, q: Quaternion) {
        if !q.is_finite() {
            trace!("Dropping non-finite orientation sample {:?}", q);
            return;
        }
        self.slot.store(q);
    }

    /// Publish from raw components in (w, x, y, z) order
    pub fn publish_wxyz(&self, q: [f64; 4]) {
        self.publish(Quaternion::from_wxyz(q));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_has_no_sample() {
        let slot = OrientationSlot::default();
        assert_eq!(slot.latest(), None);
    }

    #[test]
    fn test_latest_sample_wins() {
        let slot = OrientationSlot::default();
        let publisher = OrientationPublisher::new(slot.clone());
        publisher.publish_wxyz([1.0, 0.0, 0.0, 0.0]);
        publisher.publish_wxyz([0.0, 1.0, 0.0, 0.0]);
        assert_eq!(slot.latest(), Some(Quaternion::new(0.0, 1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reset_restores_sentinel() {
        let slot = OrientationSlot::default();
        OrientationPublisher::new(slot.clone()).publish(Quaternion::IDENTITY);
        slot.reset();
        assert_eq!(slot.latest(), None);
    }

    #[test]
    fn test_non_finite_dropped() {
        let slot = OrientationSlot::default();
        let publisher = OrientationPublisher::new(slot.clone());
        publisher.publish(Quaternion::IDENTITY);
        publisher.publish_wxyz([f64::NAN, 0.0, 0.0, 0.0]);
        assert_eq!(slot.latest(), Some(Quaternion::IDENTITY));
    }

    #[test]
    fn test_publish_from_other_thread() {
        let slot = OrientationSlot::default();
        let publisher = OrientationPublisher::new(slot.clone());
        let handle = std::thread::spawn(move || {
            for i in 1..=100 {
                publisher.publish_wxyz([f64::from(i), 0.0, 0.0, f64::from(i)]);
            }
        });
        handle.join().unwrap();
        let q = slot.latest().unwrap();
        // Components always come from the same sample
        assert_eq!(q.w, q.z);
        assert_eq!(q.w, 100.0);
    }
}
