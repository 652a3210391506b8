//! Scheduling order.
//!
//! Decides which pending unit a worker runs next: highest priority first,
//! oldest first within a priority.

pub mod priority;

pub use priority::PriorityQueue;
