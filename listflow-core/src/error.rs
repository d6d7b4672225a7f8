use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Remote listing call failed. Recoverable: the cycle aborts with no
    /// state mutation and the next trigger retries from scratch.
    #[error("Listing Error - {0}")]
    Listing(String),

    /// State store was unavailable or rejected a read/write. A failed read
    /// aborts the cycle; a failed write after emission falls under the
    /// at-least-once policy documented on the coordinator.
    #[error("State Persist Error - {0}")]
    StatePersist(String),

    /// Persisted state could not be decoded or does not match the
    /// configured strategy. Never silently reset: that would re-emit the
    /// entire listing history. Requires operator intervention.
    #[error("State Corrupt Error - {0}")]
    StateCorrupt(String),

    /// Invalid configuration, rejected before any poll runs.
    #[error("Config Error - {0}")]
    Config(String),
}
