use crate::executor::panic_handler::PanicInfo;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The unit was still queued when the pool shut down and never ran.
    #[error("task abandoned: pool shut down before it ran")]
    Abandoned,

    /// The handle's result was already taken by an earlier `get`.
    #[error("task result already consumed")]
    AlreadyConsumed,

    /// A result slot was written more than once.
    #[error("task result already completed")]
    AlreadyCompleted,

    #[error("task panicked: {}", .0.message())]
    Panicked(PanicInfo),

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// True for the failure kinds that mean the unit never produced a value
    /// because of pool lifecycle rather than the callable itself.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Abandoned)
    }

    /// Returns the caught panic, if this error came from a panicking task.
    pub fn into_panic(self) -> Option<PanicInfo> {
        match self {
            Error::Panicked(info) => Some(info),
            _ => None,
        }
    }
}
