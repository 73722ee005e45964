//! Configuration model for the worker pool.

pub mod pool;

pub use pool::PoolConfig;
