//! Task representation and ordering.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task, allocated in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Scheduling priority. Larger values are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(pub u8);

impl Priority {
    pub const BACKGROUND: Priority = Priority(0);
    pub const LOW: Priority = Priority(64);
    pub const NORMAL: Priority = Priority(128);
    pub const HIGH: Priority = Priority(192);
    pub const REALTIME: Priority = Priority(u8::MAX);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Priority(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type-erased unit of work that runs exactly once.
pub trait Job: Send {
    fn invoke(self: Box<Self>);
}

impl<F> Job for F
where
    F: FnOnce() + Send,
{
    fn invoke(self: Box<Self>) {
        (*self)()
    }
}

/// A job plus the keys the queue orders it by.
///
/// Ordering puts higher priority first; within a priority the earlier
/// timestamp wins, and the task id settles units stamped with the same
/// instant.
pub struct TaskUnit {
    id: TaskId,
    job: Box<dyn Job>,
    priority: Priority,
    timestamp: Instant,
}

impl TaskUnit {
    pub fn new<J>(job: J, priority: Priority) -> Self
    where
        J: Job + 'static,
    {
        Self::from_boxed(Box::new(job), priority)
    }

    pub fn from_boxed(job: Box<dyn Job>, priority: Priority) -> Self {
        TaskUnit {
            id: TaskId::next(),
            job,
            priority,
            timestamp: Instant::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Runs the wrapped job, consuming the unit.
    pub fn invoke(self) {
        self.job.invoke();
    }
}

impl PartialEq for TaskUnit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for TaskUnit {}

impl PartialOrd for TaskUnit {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskUnit {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl fmt::Debug for TaskUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskUnit")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
