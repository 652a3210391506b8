use super::panic_handler::PanicHandler;
use super::task::{Job, Priority, TaskUnit};
use super::worker::{Shared, Worker, WorkerId};
use crate::bridge::{self, TaskHandle};
use crate::config::{Config, ShutdownPolicy};
use crate::error::{Error, Result};
use crate::telemetry::{Metrics, MetricsSnapshot};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// A fixed set of worker threads running submitted work in priority order.
///
/// Higher [`Priority`] runs first; equal priorities run in submission order.
/// Workers are started in the constructor and joined by [`shutdown`] or on
/// drop. By default units still queued at that point are dropped and their
/// handles resolve to [`Error::Abandoned`]; see
/// [`ShutdownPolicy`](crate::ShutdownPolicy) for the draining alternative.
///
/// [`shutdown`]: PriorityPool::shutdown
///
/// ```
/// use prio_pool::PriorityPool;
///
/// let pool = PriorityPool::new(2).unwrap();
/// let handle = pool.submit(10u8, || 6 * 7);
/// assert_eq!(handle.get().unwrap(), 42);
/// ```
#[derive(Debug)]
pub struct PriorityPool {
    workers: Vec<WorkerHandle>,
    shared: Arc<Shared>,
    num_threads: usize,
}

#[derive(Debug)]
struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
}

impl PriorityPool {
    /// Starts a pool with exactly `num_threads` workers and default settings.
    pub fn new(num_threads: usize) -> Result<Self> {
        let config = Config::builder().num_threads(num_threads).build()?;
        Self::with_config(&config)
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        if num_threads == 0 {
            return Err(Error::config("need at least 1 thread"));
        }

        let shared = Arc::new(Shared::new(
            PanicHandler::new(config.panic_strategy),
            Metrics::new()?,
            config.shutdown_policy,
        ));

        // On a spawn failure the partially built pool is dropped, which stops
        // and joins the workers started so far.
        let mut pool = Self {
            workers: Vec::with_capacity(num_threads),
            shared,
            num_threads,
        };

        for id in 0..num_threads {
            let worker = Worker::new(id, pool.shared.clone());
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let thread = builder
                .spawn(move || worker.run())
                .map_err(|source| Error::Spawn { worker: id, source })?;

            pool.workers.push(WorkerHandle {
                id,
                thread: Some(thread),
            });
        }

        debug!(
            threads = num_threads,
            policy = ?config.shutdown_policy,
            "pool started"
        );
        Ok(pool)
    }

    /// Queues `func` and returns a handle to its result without blocking.
    ///
    /// A callable returning `Result` hands its error back through
    /// [`TaskHandle::get`] unchanged; a panic surfaces as
    /// [`Error::Panicked`].
    pub fn submit<P, F, T>(&self, priority: P, func: F) -> TaskHandle<T>
    where
        P: Into<Priority>,
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (unit, handle) = bridge::bind(func, priority.into(), self.shared.panics.clone());
        self.enqueue(unit);
        handle
    }

    /// Like [`submit`](Self::submit), binding `args` as the callable's
    /// argument. Use a tuple to pass several.
    pub fn submit_with<P, F, A, T>(&self, priority: P, func: F, args: A) -> TaskHandle<T>
    where
        P: Into<Priority>,
        F: FnOnce(A) -> T + Send + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        self.submit(priority, move || func(args))
    }

    /// Queues a job with no result handle.
    pub fn execute<P, J>(&self, priority: P, job: J)
    where
        P: Into<Priority>,
        J: Job + 'static,
    {
        self.enqueue(TaskUnit::new(job, priority.into()));
    }

    fn enqueue(&self, unit: TaskUnit) {
        self.shared.metrics.record_submitted();

        let mut state = self.shared.state.lock();
        if state.stop {
            drop(state);
            warn!(task = unit.id().as_u64(), "submitted after shutdown, abandoning task");
            self.shared.metrics.record_abandoned(1);
            return;
        }
        state.queue.push(unit);
        drop(state);

        self.shared.cond.notify_one();
    }

    /// Number of queued units not yet picked up by a worker. May be stale as
    /// soon as it returns.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().stop
    }

    pub fn panic_count(&self) -> usize {
        self.shared.panics.panic_count()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared
            .metrics
            .snapshot(self.shared.panics.panic_count() as u64)
    }

    /// Stops the workers and waits for them to exit.
    ///
    /// Running units finish; queued units are dropped unless the pool was
    /// configured to drain. Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        let (already_stopped, queued) = {
            let mut state = self.shared.state.lock();
            let already_stopped = std::mem::replace(&mut state.stop, true);
            // Under Abandon no worker pops once stop is set, so the queue can
            // be released before the join; a running unit waiting on a queued
            // one would otherwise keep its worker from ever exiting.
            let queued = match self.shared.shutdown_policy {
                ShutdownPolicy::Abandon => state.queue.take_all(),
                ShutdownPolicy::Drain => Vec::new(),
            };
            (already_stopped, queued)
        };
        self.abandon(queued);

        // wake everyone up to check the stop flag
        self.shared.cond.notify_all();

        let current = thread::current().id();
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                // The last owner may be one of our own workers.
                if thread.thread().id() == current {
                    continue;
                }
                if thread.join().is_err() {
                    error!(worker = worker.id, "worker thread panicked");
                }
            }
        }

        // anything a skipped self-join left behind
        let leftover = self.shared.state.lock().queue.take_all();
        self.abandon(leftover);

        if !already_stopped {
            debug!(threads = self.num_threads, "pool shut down");
        }
    }

    // Must be called without the state lock held; each drop wakes the
    // unit's handle.
    fn abandon(&self, units: Vec<TaskUnit>) {
        if units.is_empty() {
            return;
        }
        debug!(count = units.len(), "abandoning queued tasks");
        self.shared.metrics.record_abandoned(units.len());
        drop(units);
    }
}

impl Drop for PriorityPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
