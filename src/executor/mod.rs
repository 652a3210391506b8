//! Task execution infrastructure.
//!
//! The ordered task unit, the worker loop, panic capture, and the
//! fixed-size pool that ties them together.

pub mod panic_handler;
pub mod pool;
pub mod task;
pub(crate) mod worker;

pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use pool::PriorityPool;
pub use task::{Job, Priority, TaskId, TaskUnit};
