//! Core pool, worker, and queue implementation.

pub mod error;
pub mod pool;
pub mod queue;
pub mod worker;

pub use error::PoolError;
pub use pool::{PoolStats, WorkerPool};
pub use queue::{Task, TaskQueue};
pub use worker::WorkerState;
