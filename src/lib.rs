//! prio-pool - a fixed-size thread pool with priority scheduling
//!
//! Work submitted to a [`PriorityPool`] runs on a fixed set of OS threads,
//! most urgent first. Units sharing a priority run in the order they were
//! submitted. Each submission returns a [`TaskHandle`] right away; the
//! handle yields the callable's value, its panic, or the fact that the pool
//! shut down before the unit ran.
//!
//! # Quick Start
//!
//! ```
//! use prio_pool::prelude::*;
//!
//! let pool = PriorityPool::new(4).unwrap();
//!
//! let background = pool.submit(Priority::LOW, || (1..=10).sum::<i32>());
//! let urgent = pool.submit(Priority::HIGH, || "now");
//!
//! assert_eq!(urgent.get().unwrap(), "now");
//! assert_eq!(background.get().unwrap(), 55);
//! ```
//!
//! # Shutdown
//!
//! Dropping the pool (or calling [`PriorityPool::shutdown`]) stops the
//! workers and waits for them. Units that have not started are dropped and
//! their handles report [`Error::Abandoned`], unless the pool was built with
//! [`ShutdownPolicy::Drain`].

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;
pub mod telemetry;

// Re-export key types at crate root
pub use bridge::TaskHandle;
pub use config::{Config, ConfigBuilder, ShutdownPolicy};
pub use error::{Error, Result};
pub use executor::{PanicInfo, PanicStrategy, Priority, PriorityPool, TaskId};
pub use telemetry::MetricsSnapshot;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_submit() {
        let pool = PriorityPool::new(2).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i: i32| pool.submit(Priority::NORMAL, move || i * i))
            .collect();
        let sum: i32 = handles.iter().map(|h| h.get().unwrap()).sum();

        assert_eq!(sum, 285);
    }

    #[test]
    fn test_config_pool() {
        let config = Config::builder()
            .num_threads(2)
            .thread_name_prefix("lib-test")
            .build()
            .unwrap();
        let pool = PriorityPool::with_config(&config).unwrap();

        let name = pool.submit(Priority::NORMAL, || {
            std::thread::current().name().map(str::to_owned)
        });
        let name = name.get().unwrap().unwrap();
        assert!(name.starts_with("lib-test-"));
    }
}
