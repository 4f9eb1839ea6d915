//! Ordering scheduler.
//!
//! A strictly FIFO, non-reentrant execution queue. The first caller to
//! schedule a task while the queue is idle drains it on its own thread; any
//! task scheduled while a drain is running (including from inside a task)
//! is appended and runs after everything queued before it.
//!
//! Each plugin owns its own scheduler, so two stores bridged side by side
//! never interleave through a shared queue.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Queue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    draining: AtomicBool,
}

/// Shared handle to a FIFO trampoline queue.
#[derive(Clone)]
pub struct QueueScheduler {
    queue: Arc<Queue>,
}

/// Clears the draining flag when a drain ends, including by panic.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl QueueScheduler {
    /// Create a new, empty scheduler.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            queue: Arc::new(Queue {
                sender,
                receiver,
                draining: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue a task and drain the queue unless a drain is already running.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Both ends live in `self.queue`, so the channel cannot be disconnected.
        let _ = self.queue.sender.send(Box::new(task));
        self.drain();
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.receiver.len()
    }

    /// Whether a drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.queue.draining.load(Ordering::Acquire)
    }

    fn drain(&self) {
        loop {
            if self
                .queue
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            {
                let _guard = DrainGuard(&self.queue.draining);
                while let Ok(task) = self.queue.receiver.try_recv() {
                    task();
                }
            }

            // Another thread may have enqueued between the last try_recv and
            // the flag reset; pick that work up instead of stranding it.
            if self.queue.receiver.is_empty() {
                return;
            }
        }
    }
}

impl Default for QueueScheduler {
    fn default() -> Self {
        Self::new()
    }
}
