use super::slot::Completer;
use crate::error::Error;
use crate::executor::panic_handler::PanicHandler;
use crate::executor::task::Job;
use std::sync::Arc;
use tracing::error;

/// Adapter that runs a value-producing callable and routes its outcome,
/// panic included, into the linked result slot.
pub(crate) struct BoundJob<F, T> {
    func: F,
    completer: Completer<T>,
    panics: Arc<PanicHandler>,
}

impl<F, T> BoundJob<F, T> {
    pub(crate) fn new(func: F, completer: Completer<T>, panics: Arc<PanicHandler>) -> Self {
        Self {
            func,
            completer,
            panics,
        }
    }
}

impl<F, T> Job for BoundJob<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    fn invoke(self: Box<Self>) {
        let BoundJob {
            func,
            completer,
            panics,
        } = *self;

        let outcome = panics.execute(func).map_err(Error::Panicked);
        if let Err(e) = completer.complete(outcome) {
            error!(error = %e, "task outcome could not be delivered");
        }
    }
}
