//! Counters and queue-wait latency for a pool.

use crate::error::{Error, Result};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// One hour in nanoseconds
const MAX_TRACKED_WAIT_NS: u64 = 3_600_000_000_000;

/// Pool metrics collector
#[derive(Debug)]
pub struct Metrics {
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_abandoned: AtomicU64,
    busy_time_ns: AtomicU64,

    // Time from submission to the start of execution
    wait_histogram: Mutex<Histogram<u64>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let histogram = Histogram::new_with_max(MAX_TRACKED_WAIT_NS, 3)
            .map_err(|e| Error::config(format!("wait histogram: {:?}", e)))?;

        Ok(Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_abandoned: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
            wait_histogram: Mutex::new(histogram),
            start_time: Instant::now(),
        })
    }

    pub fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task that ran after waiting `wait` in the queue for `busy`.
    pub fn record_execution(&self, wait: Duration, busy: Duration) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        self.busy_time_ns
            .fetch_add(busy.as_nanos() as u64, Ordering::Relaxed);

        let wait_ns = (wait.as_nanos() as u64).min(MAX_TRACKED_WAIT_NS);
        let _ = self.wait_histogram.lock().record(wait_ns);
    }

    pub fn record_abandoned(&self, count: usize) {
        self.tasks_abandoned
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics. `tasks_panicked` is supplied by the
    /// caller since panics are counted by the panic handler.
    pub fn snapshot(&self, tasks_panicked: u64) -> MetricsSnapshot {
        let histogram = self.wait_histogram.lock();

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked,
            tasks_abandoned: self.tasks_abandoned.load(Ordering::Relaxed),
            busy_time_ns: self.busy_time_ns.load(Ordering::Relaxed),
            avg_wait_ns: if histogram.len() > 0 {
                histogram.mean() as u64
            } else {
                0
            },
            p50_wait_ns: histogram.value_at_quantile(0.50),
            p99_wait_ns: histogram.value_at_quantile(0.99),
            max_wait_ns: histogram.max(),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_submitted: u64,
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub tasks_abandoned: u64,
    pub busy_time_ns: u64,
    pub avg_wait_ns: u64,
    pub p50_wait_ns: u64,
    pub p99_wait_ns: u64,
    pub max_wait_ns: u64,
}

impl MetricsSnapshot {
    /// Calculate tasks per second
    pub fn tasks_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tasks_executed as f64 / seconds
    }

    /// Submitted tasks that have neither run nor been abandoned yet.
    pub fn outstanding(&self) -> u64 {
        self.tasks_submitted
            .saturating_sub(self.tasks_executed + self.tasks_abandoned)
    }
}
