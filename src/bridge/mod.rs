//! Submission bridge.
//!
//! Turns a value-producing callable into a type-erased [`Job`] plus a
//! [`TaskHandle`] that receives the callable's outcome.

mod handle;
mod job;
mod slot;

pub use handle::TaskHandle;

use crate::executor::panic_handler::PanicHandler;
use crate::executor::task::{Job, Priority, TaskUnit};
use job::BoundJob;
use slot::{Completer, ResultSlot};
use std::sync::Arc;

/// Wraps `func` into a queueable unit and the handle linked to it.
pub(crate) fn bind<F, T>(
    func: F,
    priority: Priority,
    panics: Arc<PanicHandler>,
) -> (TaskUnit, TaskHandle<T>)
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let slot = ResultSlot::new();
    let job: Box<dyn Job> = Box::new(BoundJob::new(func, Completer::new(slot.clone()), panics));
    let unit = TaskUnit::from_boxed(job, priority);
    let handle = TaskHandle::new(unit.id(), priority, slot);
    (unit, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_links_unit_and_handle() {
        let panics = Arc::new(PanicHandler::default());
        let (unit, handle) = bind(|| 8 / 2, Priority(1), panics);

        assert_eq!(unit.id(), handle.task_id());
        assert_eq!(handle.priority(), Priority(1));
        assert!(!handle.is_ready());
        assert!(handle.try_get().is_none());

        unit.invoke();
        assert!(handle.is_ready());
        assert_eq!(handle.get().unwrap(), 4);
        assert!(matches!(handle.get(), Err(crate::Error::AlreadyConsumed)));
    }

    #[test]
    fn test_dropped_unit_abandons_handle() {
        let panics = Arc::new(PanicHandler::default());
        let (unit, handle) = bind(|| 3 - 2, Priority(0), panics);

        drop(unit);
        assert!(matches!(handle.try_get(), Some(Err(crate::Error::Abandoned))));
        assert!(matches!(handle.get(), Err(crate::Error::Abandoned)));
    }
}
