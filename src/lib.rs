//! # Elastic Pool
//!
//! A dynamically-sized worker pool for fire-and-forget work.
//!
//! The pool accepts zero-argument closures ("tasks") and executes them on a
//! bounded, elastic set of reusable OS-thread workers. Workers are pre-warmed
//! at construction, grow (one at a time, up to `max_workers`) whenever a task
//! is submitted while every live worker is busy, and shrink back toward zero
//! by self-terminating once idle past the configured limit. Shutdown is
//! graceful: intake stops, the queue drains, and the call returns once every
//! worker has stopped.
//!
//! ## Core Contract
//!
//! - **No backpressure**: `submit` never blocks and never fails; the queue is
//!   unbounded and a task submitted before shutdown runs exactly once.
//! - **Saturation-gated growth**: a new worker is created only when all live
//!   workers are busy, so bursts that arrive while workers are idle reuse
//!   them instead of growing the pool.
//! - **Time-based shrink**: each worker independently exits after sitting
//!   idle longer than the configured limit; the pool can shrink below its
//!   pre-warmed size, all the way to zero, and recovers on the next submit.
//! - **Graceful drain**: `shutdown` blocks until every task queued before it
//!   was called has completed and every worker has stopped. It is idempotent
//!   and unbounded: a task that never returns hangs shutdown forever.
//! - **Contained failures**: a panicking task is caught, logged, and counted;
//!   it never crashes its worker or the pool, and it is never retried.
//!
//! ## Example
//!
//! ```rust
//! use elastic_pool::config::PoolConfig;
//! use elastic_pool::core::WorkerPool;
//! use std::time::Duration;
//!
//! let config = PoolConfig::new()
//!     .with_max_workers(4)
//!     .with_max_idle(Duration::from_secs(30));
//!
//! let pool = WorkerPool::new(config).expect("valid config");
//!
//! for i in 0..10 {
//!     pool.submit(move || {
//!         println!("task {i} running");
//!     });
//! }
//!
//! // Blocks until all ten tasks have completed and every worker has stopped.
//! pool.shutdown();
//! ```
//!
//! Tasks submitted after `shutdown` are silently dropped (observable via
//! [`core::PoolStats`]); see [`core::WorkerPool::submit`].

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core pool, worker, and queue implementation.
pub mod core;
/// Configuration model for the pool.
pub mod config;
/// Shared utilities.
pub mod util;
