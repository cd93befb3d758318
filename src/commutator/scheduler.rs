// Fixed-period task runners for the control loop
//
// The controller only needs "run this every period" and "stop running it".
// Runs never overlap. Cancelling does not wait for a run already executing;
// the controller's own state lock keeps such a run from acting after stop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, warn};

/// Periodic work item
pub type Task = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    type Handle: Send;

    /// Run `task` every `period`, first run one period from now
    fn schedule(&self, period: Duration, task: Task) -> Self::Handle;

    /// Stop scheduling the task; a run already in progress may complete
    fn cancel(&self, handle: Self::Handle);
}

/// Runs tasks on a tokio runtime with `tokio::time::interval`
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Scheduler on the runtime of the calling context, if there is one
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    /// Each run goes to the blocking pool: ticks write to the serial port
    fn schedule(&self, period: Duration, task: Task) -> JoinHandle<()> {
        debug!("Scheduling task every {:?}", period);
        let task = Arc::new(Mutex::new(task));
        self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = interval_at(start, period);
            // A late tick is not worth catching up on; only the newest sample matters
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let task = Arc::clone(&task);
                let run = tokio::task::spawn_blocking(move || {
                    let mut task = task.lock();
                    (*task)();
                });
                if let Err(e) = run.await {
                    warn!("Scheduled task failed: {}", e);
                }
            }
        })
    }

    fn cancel(&self, handle: JoinHandle<()>) {
        handle.abort();
    }
}

#[derive(Default)]
struct ManualSlot {
    generation: u64,
    period: Option<Duration>,
    task: Option<Task>,
}

/// Scheduler whose ticks are fired explicitly by the owner
///
/// For hosts that already own a timer, and for deterministic tests.
#[derive(Clone, Default)]
pub struct ManualScheduler(Arc<Mutex<ManualSlot>>);

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the scheduled task once; returns false if nothing is scheduled
    pub fn fire(&self) -> bool {
        let mut slot = self.0.lock();
        match slot.task.as_mut() {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.0.lock().task.is_some()
    }

    /// Period requested by the current task
    pub fn period(&self) -> Option<Duration> {
        self.0.lock().period
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn schedule(&self, period: Duration, task: Task) -> u64 {
        let mut slot = self.0.lock();
        slot.generation += 1;
        slot.period = Some(period);
        slot.task = Some(task);
        slot.generation
    }

    fn cancel(&self, handle: u64) {
        let mut slot = self.0.lock();
        if slot.generation == handle {
            slot.task = None;
            slot.period = None;
        }
    }
}
