use super::slot::ResultSlot;
use crate::error::Result;
use crate::executor::task::{Priority, TaskId};
use std::fmt;
use std::sync::Arc;

/// Caller side of a submitted task.
///
/// Valid as soon as `submit` returns. The result can be taken once; later
/// calls report [`Error::AlreadyConsumed`](crate::Error::AlreadyConsumed).
/// Dropping the handle does not cancel the task.
pub struct TaskHandle<T> {
    id: TaskId,
    priority: Priority,
    slot: Arc<ResultSlot<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: TaskId, priority: Priority, slot: Arc<ResultSlot<T>>) -> Self {
        Self { id, priority, slot }
    }

    /// Blocks until the task has run or been abandoned, then takes its result.
    ///
    /// Fails with [`Error::Panicked`](crate::Error::Panicked) if the task
    /// panicked, [`Error::Abandoned`](crate::Error::Abandoned) if the pool
    /// shut down first, and [`Error::AlreadyConsumed`](crate::Error::AlreadyConsumed)
    /// if the result was already taken.
    pub fn get(&self) -> Result<T> {
        self.slot.wait_take()
    }

    /// Non-blocking variant of [`get`](Self::get). `None` means still pending.
    pub fn try_get(&self) -> Option<Result<T>> {
        self.slot.try_take()
    }

    /// True once the task has run or been abandoned.
    pub fn is_ready(&self) -> bool {
        self.slot.is_resolved()
    }

    pub fn task_id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("ready", &self.is_ready())
            .finish()
    }
}
