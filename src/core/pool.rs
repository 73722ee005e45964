//! Worker pool manager: submission, saturation-gated scale-up, and the
//! graceful drain-and-stop shutdown protocol.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;

use super::error::PoolError;
use super::queue::TaskQueue;
use super::worker::{WorkerHandle, WorkerState};

/// Statistics about pool utilization.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Workers currently live (idle or running).
    pub live_workers: usize,
    /// Workers currently executing a task.
    pub busy_workers: usize,
    /// Tasks waiting in the queue.
    pub queued_tasks: usize,
    /// Total tasks accepted by `submit`.
    pub submitted_tasks: u64,
    /// Total tasks completed without panicking.
    pub completed_tasks: u64,
    /// Total tasks that panicked during execution.
    pub panicked_tasks: u64,
    /// Total tasks dropped because the pool was already shut down.
    pub dropped_tasks: u64,
}

/// Internal counters for pool statistics (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub panicked_tasks: AtomicU64,
    pub dropped_tasks: AtomicU64,
}

/// A dynamically-sized pool of reusable workers.
///
/// Workers are pre-warmed at construction. `submit` grows the pool by one
/// worker whenever every live worker is busy and the count is below
/// `max_workers`; each worker shrinks the pool on its own by exiting once
/// idle past `max_idle_ms`. The live worker count therefore ranges over
/// `0..=max_workers` during the pool's lifetime.
///
/// All state is owned by the instance; independent pools coexist freely.
pub struct WorkerPool {
    config: PoolConfig,
    queue: TaskQueue,
    /// Worker collection. Membership changes (scale-up, reaping, the
    /// shutdown handoff) happen under this mutex; it is never held across
    /// a join.
    workers: Mutex<Vec<WorkerHandle>>,
    /// Serializes submissions with worker idle-exit decisions. A worker
    /// takes the gate before committing to stop, so a task enqueued under
    /// it is either seen by that worker's final queue check or finds the
    /// worker already retired and spawns a replacement.
    gate: Arc<Mutex<()>>,
    /// Held for the join phase of `shutdown`. Concurrent shutdown callers
    /// rendezvous here instead of on the collection mutex, so submitters
    /// and stats readers are never parked behind the drain.
    drain: Mutex<()>,
    shutdown: AtomicBool,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Create a pool and immediately pre-warm `max_workers` workers.
    ///
    /// Pre-warmed workers are subject to the idle limit like any other, so
    /// an unused pool shrinks toward zero workers over time.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfig`] if the configuration is invalid.
    /// - [`PoolError::Spawn`] if an OS thread could not be created.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let queue = TaskQueue::new();
        let counters = Arc::new(PoolCounters::default());
        let gate = Arc::new(Mutex::new(()));

        let mut workers = Vec::with_capacity(config.max_workers);
        for _ in 0..config.max_workers {
            workers.push(WorkerHandle::spawn(
                queue.subscribe(),
                config.max_idle(),
                Arc::clone(&gate),
                Arc::clone(&counters),
            )?);
        }

        info!(
            max_workers = config.max_workers,
            max_idle_ms = config.max_idle_ms,
            "worker pool initialized with pre-warmed workers"
        );

        Ok(Self {
            config,
            queue,
            workers: Mutex::new(workers),
            gate,
            drain: Mutex::new(()),
            shutdown: AtomicBool::new(false),
            counters,
        })
    }

    /// Submit a task for execution. Fire-and-forget: never blocks, never
    /// errors, no backpressure regardless of queue depth.
    ///
    /// If every live worker is busy and the pool is below `max_workers`, one
    /// additional worker is started before the task is enqueued. The
    /// check-and-spawn is atomic with respect to concurrent submissions, so
    /// the live worker count never exceeds `max_workers`; it is also
    /// serialized with worker idle exits, so a task submitted at the exact
    /// moment the last idle worker's budget expires is never stranded.
    ///
    /// # Post-shutdown policy
    ///
    /// Tasks submitted after [`shutdown`](Self::shutdown) has been invoked
    /// are **silently dropped**: no error is surfaced and the closure never
    /// runs. Drops are counted in [`PoolStats::dropped_tasks`] and logged at
    /// debug level.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shutdown.load(Ordering::Acquire) {
            self.counters.dropped_tasks.fetch_add(1, Ordering::Relaxed);
            debug!("task dropped: pool is shut down");
            return;
        }

        // Holding the gate across the availability check and the enqueue
        // linearizes this submission against worker idle exits: any worker
        // not yet retired here will re-read the queue before stopping.
        let _gate = self.gate.lock();
        {
            let mut workers = self.workers.lock();

            // Shutdown may have begun while we waited for the lock; never
            // start a worker past end of life.
            if self.shutdown.load(Ordering::Acquire) {
                self.counters.dropped_tasks.fetch_add(1, Ordering::Relaxed);
                debug!("task dropped: pool is shut down");
                return;
            }

            // Idled-out workers have already exited on their own; reaping
            // their handles here is what lets the pool grow again later.
            workers.retain(|w| !w.is_stopped());

            if workers.iter().all(WorkerHandle::is_busy) && workers.len() < self.config.max_workers
            {
                match WorkerHandle::spawn(
                    self.queue.subscribe(),
                    self.config.max_idle(),
                    Arc::clone(&self.gate),
                    Arc::clone(&self.counters),
                ) {
                    Ok(worker) => {
                        debug!(
                            worker_id = %worker.id(),
                            live_workers = workers.len() + 1,
                            "all workers busy, scaled up"
                        );
                        workers.push(worker);
                    }
                    // The task still queues; an existing worker will get to
                    // it once free.
                    Err(e) => error!(error = %e, "failed to scale up worker pool"),
                }
            }
        }

        if self.queue.enqueue(Box::new(task)) {
            self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
        } else {
            // Shutdown closed the queue between the flag check and here.
            self.counters.dropped_tasks.fetch_add(1, Ordering::Relaxed);
            debug!("task dropped: queue closed during submission");
        }
    }

    /// Shut down the pool gracefully.
    ///
    /// Stops accepting tasks, then blocks until every task already queued
    /// has completed and every worker has stopped. Idempotent: concurrent
    /// and repeated calls all return once the drain is complete.
    ///
    /// The wait is unbounded. A pathological task that never returns keeps
    /// its worker alive and hangs this call forever; this is a documented
    /// limitation, and the pool never interrupts a worker mid-task.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            info!("shutting down worker pool");
        }

        // Closing the queue wakes idle workers immediately; workers keep
        // draining queued tasks and exit once the channel reports empty and
        // disconnected.
        self.queue.close();

        // Joins happen under the drain lock with the collection mutex
        // released, so worker_count/stats callers and racing submitters see
        // at most a brief handoff. Every shutdown caller passes through the
        // drain lock and so returns only once all workers have stopped.
        let _drain = self.drain.lock();
        let stopped = std::mem::take(&mut *self.workers.lock());
        let worker_count = stopped.len();
        for worker in stopped {
            let id = worker.id();
            if worker.join().is_err() {
                warn!(worker_id = %id, "worker thread panicked outside task execution");
            }
        }

        if worker_count > 0 {
            info!(worker_count, "worker pool drained, all workers stopped");
        }
    }

    /// Number of currently live workers (idle or running). Trends toward
    /// zero when the pool sits idle past the configured limit.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        let mut workers = self.workers.lock();
        workers.retain(|w| !w.is_stopped());
        workers.len()
    }

    /// Snapshot of pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let (live_workers, busy_workers) = {
            let mut workers = self.workers.lock();
            workers.retain(|w| !w.is_stopped());
            let busy = workers.iter().filter(|w| w.is_busy()).count();
            (workers.len(), busy)
        };

        PoolStats {
            live_workers,
            busy_workers,
            queued_tasks: self.queue.len(),
            submitted_tasks: self.counters.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.counters.completed_tasks.load(Ordering::Relaxed),
            panicked_tasks: self.counters.panicked_tasks.load(Ordering::Relaxed),
            dropped_tasks: self.counters.dropped_tasks.load(Ordering::Relaxed),
        }
    }

    /// Lifecycle state of every worker still in the collection, reaping
    /// stopped ones along the way.
    #[must_use]
    pub fn worker_states(&self) -> Vec<WorkerState> {
        let mut workers = self.workers.lock();
        workers.retain(|w| !w.is_stopped());
        workers.iter().map(WorkerHandle::state).collect()
    }

    /// The configuration this pool was built with.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Signal shutdown but do not join: a pool dropped without an
        // explicit shutdown() must not block, and closed-channel workers
        // drain and exit on their own.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.queue.close();
            debug!("worker pool dropped without explicit shutdown, workers will drain and stop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn config(max_workers: usize, max_idle_ms: u64) -> PoolConfig {
        PoolConfig::new()
            .with_max_workers(max_workers)
            .with_max_idle(Duration::from_millis(max_idle_ms))
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            WorkerPool::new(config(0, 1000)),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pool_prewarms_max_workers() {
        let pool = WorkerPool::new(config(3, 5000)).unwrap();
        assert_eq!(pool.worker_count(), 3);
        pool.shutdown();
    }

    #[test]
    fn test_stats_after_completion() {
        let pool = WorkerPool::new(config(2, 5000)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();

        let stats = pool.stats();
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(stats.submitted_tasks, 4);
        assert_eq!(stats.completed_tasks, 4);
        assert_eq!(stats.live_workers, 0);
        assert_eq!(stats.queued_tasks, 0);
    }

    #[test]
    fn test_config_accessor() {
        let pool = WorkerPool::new(config(2, 1234)).unwrap();
        assert_eq!(pool.config().max_workers, 2);
        assert_eq!(pool.config().max_idle_ms, 1234);
        pool.shutdown();
    }

    #[test]
    fn test_drop_without_shutdown_does_not_block() {
        let pool = WorkerPool::new(config(2, 10_000)).unwrap();
        pool.submit(|| std::thread::sleep(Duration::from_millis(50)));
        // Dropping must return promptly even with a task in flight.
        let start = std::time::Instant::now();
        drop(pool);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
