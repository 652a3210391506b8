pub use crate::config::{Config, ConfigBuilder, ShutdownPolicy};
pub use crate::error::{Error, Result};
pub use crate::executor::{PanicStrategy, Priority, PriorityPool};
pub use crate::bridge::TaskHandle;
