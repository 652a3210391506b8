// worker thread loop
use super::panic_handler::PanicHandler;
use super::task::TaskUnit;
use crate::config::ShutdownPolicy;
use crate::scheduler::PriorityQueue;
use crate::telemetry::Metrics;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

pub type WorkerId = usize;

/// Queue and stop flag, always read and written under one lock.
#[derive(Debug, Default)]
pub(crate) struct PoolState {
    pub queue: PriorityQueue,
    pub stop: bool,
}

/// Everything the workers and the submitting side share.
#[derive(Debug)]
pub(crate) struct Shared {
    pub state: Mutex<PoolState>,
    pub cond: Condvar,
    pub panics: Arc<PanicHandler>,
    pub metrics: Metrics,
    pub shutdown_policy: ShutdownPolicy,
}

impl Shared {
    pub fn new(panics: PanicHandler, metrics: Metrics, shutdown_policy: ShutdownPolicy) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            cond: Condvar::new(),
            panics: Arc::new(panics),
            metrics,
            shutdown_policy,
        }
    }
}

pub(crate) struct Worker {
    pub id: WorkerId,
    shared: Arc<Shared>,
}

impl Worker {
    pub fn new(id: WorkerId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    // main loop
    pub fn run(&self) {
        debug!(worker = self.id, "worker started");

        while let Some(unit) = self.next_unit() {
            self.execute(unit);
        }

        debug!(worker = self.id, "worker stopped");
    }

    /// Blocks until there is a unit to run, or returns `None` once the
    /// worker should stop. Every wake re-checks both conditions, so spurious
    /// wakeups are harmless.
    fn next_unit(&self) -> Option<TaskUnit> {
        let mut state = self.shared.state.lock();
        loop {
            if state.stop
                && (self.shared.shutdown_policy == ShutdownPolicy::Abandon || state.queue.is_empty())
            {
                return None;
            }

            if let Some(unit) = state.queue.pop() {
                return Some(unit);
            }

            self.shared.cond.wait(&mut state);
        }
    }

    // runs outside the lock so other workers can proceed
    fn execute(&self, unit: TaskUnit) {
        let wait = unit.timestamp().elapsed();
        trace!(
            worker = self.id,
            task = unit.id().as_u64(),
            priority = unit.priority().value(),
            "running task"
        );

        let start = Instant::now();
        // Value-producing tasks catch their own panics; this covers bare jobs.
        let _ = self.shared.panics.execute(|| unit.invoke());

        self.shared.metrics.record_execution(wait, start.elapsed());
    }
}
