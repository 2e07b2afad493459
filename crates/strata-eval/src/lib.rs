//! Deduplicating block evaluation queues and their per-tick scheduling.
#![forbid(unsafe_code)]

mod queue;
mod scheduler;
mod timed;

pub use queue::{EvalNode, EvalQueue};
pub use scheduler::{DuePasses, EvalScheduler, EvalTiming, QueueKind};
pub use timed::TimedInvalidates;
