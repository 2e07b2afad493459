//! Background terrain generation workers.
#![forbid(unsafe_code)]

mod pool;
mod worker;

pub use pool::{GenerationPool, GeneratorFactory, PoolStats};
pub use worker::WorkerState;

/// Worker count used when the configuration does not name one.
pub const DEFAULT_WORKERS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[from] std::io::Error),
}
