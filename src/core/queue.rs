//! Unbounded FIFO task queue shared between the pool and its workers.
//!
//! Built on an unbounded crossbeam channel: `enqueue` is a non-blocking send
//! that always succeeds while the queue is open, and each worker dequeues
//! through its own cloned [`Receiver`], which guarantees that any given task
//! is delivered to exactly one worker. Closing the queue (dropping the
//! sender) is the shutdown signal: a closed channel keeps delivering tasks
//! that were already queued and only then reports disconnection, which gives
//! workers the drain-then-stop behavior for free.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// A unit of work submitted to the pool. Runs exactly once on one worker.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Unbounded, thread-safe FIFO of pending tasks.
pub struct TaskQueue {
    /// Sender slot. `None` after `close()`, which disconnects the channel
    /// once the remaining tasks have been drained.
    tx: Mutex<Option<Sender<Task>>>,
    rx: Receiver<Task>,
}

impl TaskQueue {
    /// Create an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Append a task to the tail.
    ///
    /// Never blocks. Returns `false` if the queue has been closed, in which
    /// case the task is dropped.
    pub fn enqueue(&self, task: Task) -> bool {
        let tx = self.tx.lock();
        match tx.as_ref() {
            // Send on an unbounded channel only fails when disconnected,
            // which cannot happen while we hold the sender.
            Some(tx) => tx.send(task).is_ok(),
            None => false,
        }
    }

    /// Remove and return the head task, if any. Non-blocking.
    #[must_use]
    pub fn try_dequeue(&self) -> Option<Task> {
        self.rx.try_recv().ok()
    }

    /// A receiver handle for a worker. Each task is delivered to exactly one
    /// receiver; workers block on it with a bounded timeout.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<Task> {
        self.rx.clone()
    }

    /// Close the queue. Already-queued tasks remain dequeueable; once they
    /// are drained, receivers observe disconnection and stop. Idempotent.
    pub fn close(&self) {
        let mut tx = self.tx.lock();
        *tx = None;
    }

    /// Whether `close()` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Number of tasks currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
