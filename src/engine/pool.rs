//! Fixed-size worker pool with a completion timeout.
//!
//! Workers pull units from a shared [`WorkQueue`] and report through a
//! channel. The collector waits at most `timeout` for each next completion,
//! not for each unit: a slow unit is fine as long as some worker keeps
//! finishing within the window. When a wait expires the queue is closed and
//! every unit not yet reported is abandoned, including queued units no
//! worker has started. A unit that fails or panics only loses its own result.
//!
//! Each [`WorkerPool::run`] call spawns its own threads.
//! Threads are not joined after a timeout; a worker stuck inside a unit
//! lives until that unit returns, then exits because the queue is closed.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::Result;

/// Shared queue of indexed work units.
pub struct WorkQueue<T> {
    /// Units waiting to be processed.
    items: Mutex<VecDeque<(usize, T)>>,
    /// Number of units not yet completed.
    remaining: AtomicUsize,
    /// Whether the queue is closed.
    closed: AtomicBool,
}

impl<T> WorkQueue<T> {
    /// Create a queue, tagging each item with its position.
    pub fn new(items: Vec<T>) -> Self {
        let remaining = items.len();
        Self {
            items: Mutex::new(items.into_iter().enumerate().collect()),
            remaining: AtomicUsize::new(remaining),
            closed: AtomicBool::new(false),
        }
    }

    /// Take the next unit, or `None` once empty or closed.
    pub fn steal(&self) -> Option<(usize, T)> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        self.items.lock().pop_front()
    }

    /// Units not yet completed, in flight ones included.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Units no worker has taken yet.
    pub fn pending(&self) -> usize {
        self.items.lock().len()
    }

    /// Mark a unit as completed.
    pub fn complete(&self) {
        self.remaining.fetch_sub(1, Ordering::Release);
    }

    /// Close the queue (no more stealing).
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Pool configuration: worker count and per-unit timeout.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    timeout: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, timeout: Duration) -> Self {
        Self {
            workers: workers.max(1),
            timeout,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every item, returning results in input order.
    ///
    /// Failed, panicked and abandoned units yield `None`.
    pub fn run<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<Option<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let total = items.len();
        let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
        if total == 0 {
            return results;
        }

        let queue = Arc::new(WorkQueue::new(items));
        let task = Arc::new(task);
        let (tx, rx) = mpsc::channel::<(usize, Option<R>)>();

        let mut spawned = 0;
        for worker in 0..self.workers.min(total) {
            let queue = Arc::clone(&queue);
            let task = Arc::clone(&task);
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(format!("materialize-{worker}"))
                .spawn(move || drain(&queue, task.as_ref(), |idx, out| tx.send((idx, out)).is_ok()));
            match handle {
                Ok(_) => spawned += 1,
                Err(e) => tracing::warn!(worker, "failed to spawn worker thread: {}", e),
            }
        }
        drop(tx);

        if spawned == 0 {
            tracing::warn!("no worker threads available, materializing serially");
            drain(&queue, task.as_ref(), |idx, out| {
                results[idx] = out;
                true
            });
            return results;
        }

        let mut received = 0;
        while received < total {
            match rx.recv_timeout(self.timeout) {
                Ok((idx, out)) => {
                    results[idx] = out;
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    queue.close();
                    tracing::warn!(
                        abandoned = queue.remaining(),
                        never_started = queue.pending(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "materialization timed out, dropping pending rows"
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        results
    }
}

/// Process units until the queue is empty or closed, or `report` refuses.
fn drain<T, R, F, S>(queue: &WorkQueue<T>, task: &F, mut report: S)
where
    F: Fn(T) -> Result<R>,
    S: FnMut(usize, Option<R>) -> bool,
{
    while let Some((idx, item)) = queue.steal() {
        let out = match panic::catch_unwind(AssertUnwindSafe(|| task(item))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::debug!(unit = idx, "skipping unit: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(unit = idx, "unit panicked, skipping");
                None
            }
        };
        queue.complete();
        if !report(idx, out) {
            break;
        }
    }
}
