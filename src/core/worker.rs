//! Worker lifecycle: a state-holding handle plus a dedicated OS thread
//! running the pull-execute-evaluate loop.
//!
//! A worker starts idle, repeatedly pulls tasks from the shared queue, and
//! decides on its own when to stop: either its idle budget runs out (the
//! pool shrinks) or the queue is closed and drained (shutdown). While a task
//! is executing the worker never self-terminates; stop conditions are only
//! evaluated between tasks.
//!
//! The wait for work is a bounded blocking receive with a timeout equal to
//! the remaining idle budget, so an idle worker consumes no CPU and wakes
//! exactly when new work arrives or its idle deadline passes, whichever
//! comes first.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::pool::PoolCounters;
use super::queue::Task;

/// Observable lifecycle state of a worker.
///
/// Transitions: `Idle → Running → Idle → … → Stopped` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for work.
    Idle,
    /// Executing a task.
    Running,
    /// Run loop has exited. Terminal.
    Stopped,
}

/// Handle to a single worker owned by the pool's worker collection.
///
/// The `busy` flag is shared with the worker thread and is the only
/// cross-thread state besides the queue itself; the idle timestamp stays
/// private to the run loop.
pub(crate) struct WorkerHandle {
    id: Uuid,
    busy: Arc<AtomicBool>,
    /// Set by the run loop, under the pool gate for idle exits, the moment
    /// the worker commits to stopping. Read by the pool before
    /// `JoinHandle::is_finished` turns true so a stopping worker is never
    /// mistaken for an available one.
    retired: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn a new worker. It begins idle with a full idle budget.
    pub(crate) fn spawn(
        task_rx: Receiver<Task>,
        max_idle: Duration,
        gate: Arc<Mutex<()>>,
        counters: Arc<PoolCounters>,
    ) -> std::io::Result<Self> {
        let id = Uuid::new_v4();
        let busy = Arc::new(AtomicBool::new(false));
        let retired = Arc::new(AtomicBool::new(false));
        let busy_flag = Arc::clone(&busy);
        let retired_flag = Arc::clone(&retired);

        let thread = thread::Builder::new()
            .name(format!("ep-worker-{id}"))
            .spawn(move || {
                run_loop(id, &task_rx, max_idle, &busy_flag, &retired_flag, &gate, &counters);
            })?;

        Ok(Self {
            id,
            busy,
            retired,
            thread,
        })
    }

    /// The worker's unique label.
    pub(crate) const fn id(&self) -> Uuid {
        self.id
    }

    /// True strictly while a task is executing.
    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// True once the run loop has committed to stopping. Flips before the
    /// thread itself finishes, so the pool can reap and replace the worker
    /// without racing the OS thread teardown.
    pub(crate) fn is_stopped(&self) -> bool {
        self.retired.load(Ordering::SeqCst) || self.thread.is_finished()
    }

    /// Current lifecycle state.
    pub(crate) fn state(&self) -> WorkerState {
        if self.is_stopped() {
            WorkerState::Stopped
        } else if self.is_busy() {
            WorkerState::Running
        } else {
            WorkerState::Idle
        }
    }

    /// Block until the run loop exits. Unbounded: a task that never returns
    /// blocks the join forever.
    pub(crate) fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}

/// The worker run loop.
///
/// `last_active` is reset when a task completes, so the idle clock starts
/// the moment the worker goes idle and the worker stops once it has waited
/// out its whole idle budget without receiving work.
fn run_loop(
    id: Uuid,
    task_rx: &Receiver<Task>,
    max_idle: Duration,
    busy: &AtomicBool,
    retired: &AtomicBool,
    gate: &Mutex<()>,
    counters: &PoolCounters,
) {
    debug!(worker_id = %id, "worker started");
    let mut last_active = Instant::now();

    loop {
        let task = if let Some(remaining) = max_idle.checked_sub(last_active.elapsed()) {
            match task_rx.recv_timeout(remaining) {
                Ok(task) => task,
                // Woken with no work; the next iteration re-checks the budget.
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    retired.store(true, Ordering::SeqCst);
                    debug!(worker_id = %id, "queue closed and drained, worker stopping");
                    break;
                }
            }
        } else {
            // Idle budget exhausted. The exit decision is serialized with
            // submissions through the pool gate: a task enqueued before this
            // point is taken by the final check below, one enqueued after it
            // finds `retired` already set and spawns a replacement worker.
            let _gate = gate.lock();
            match task_rx.try_recv() {
                Ok(task) => task,
                Err(_) => {
                    retired.store(true, Ordering::SeqCst);
                    debug!(worker_id = %id, "idle timeout reached, worker stopping");
                    break;
                }
            }
        };

        busy.store(true, Ordering::Release);
        let outcome = panic::catch_unwind(AssertUnwindSafe(task));
        busy.store(false, Ordering::Release);
        last_active = Instant::now();

        match outcome {
            Ok(()) => {
                counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                counters.panicked_tasks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    worker_id = %id,
                    reason = panic_message(&payload),
                    "task panicked, worker continues"
                );
            }
        }
    }
}

/// Best-effort extraction of a panic payload message for logging.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}
