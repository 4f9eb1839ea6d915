//! Pull handles over channel views.

use crate::stream::{Stream, Subscription};
use crossbeam_channel::{unbounded, Receiver};
use std::time::Duration;

/// Buffers everything a view delivers until read.
///
/// Useful for observers outside the epic graph (logging, tests). The
/// underlying subscription ends when the tap is dropped.
pub struct Tap<T> {
    receiver: Receiver<T>,
    subscription: Subscription,
}

impl<T: Send + 'static> Tap<T> {
    pub(crate) fn new(stream: &Stream<T>) -> Self {
        let (sender, receiver) = unbounded();
        let subscription = stream.subscribe(move |value| {
            // Receiver gone means the tap was dropped mid-delivery.
            let _ = sender.send(value);
        });
        Self {
            receiver,
            subscription,
        }
    }

    /// Receive the next value (blocking).
    pub fn recv(&self) -> Result<T, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a value (non-blocking).
    pub fn try_recv(&self) -> Result<T, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything buffered so far.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Stop receiving; buffered values stay readable.
    pub fn close(&self) {
        self.subscription.unsubscribe();
    }
}

impl<T> Drop for Tap<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
