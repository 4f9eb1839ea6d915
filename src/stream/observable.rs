//! Observers, subscriptions and the cold stream type.

use crate::error::BridgeError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single signal delivered to an observer.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification<T> {
    Next(T),
    Error(BridgeError),
    Complete,
}

impl<T> Notification<T> {
    /// True for `Error` and `Complete`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }
}

/// Receives notifications from a stream.
pub struct Observer<T> {
    callback: Arc<dyn Fn(Notification<T>) + Send + Sync>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> Observer<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Notification<T>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn notify(&self, notification: Notification<T>) {
        (self.callback)(notification)
    }

    pub fn next(&self, value: T) {
        self.notify(Notification::Next(value))
    }

    pub fn error(&self, error: BridgeError) {
        self.notify(Notification::Error(error))
    }

    pub fn complete(&self) {
        self.notify(Notification::Complete)
    }
}

type Teardown = Box<dyn FnOnce() + Send>;

struct SubscriptionInner {
    closed: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

#[cfg(test)]
thread_local! {
    static LIVE: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Subscriptions allocated and not yet dropped on this thread.
#[cfg(test)]
pub(crate) fn live_subscriptions() -> usize {
    LIVE.with(|live| live.get())
}

#[cfg(test)]
impl Drop for SubscriptionInner {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get().saturating_sub(1)));
    }
}

/// Handle to a live subscription.
///
/// Clones share state: unsubscribing any clone closes them all. Teardowns
/// added after close run immediately.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub fn new() -> Self {
        #[cfg(test)]
        LIVE.with(|live| live.set(live.get() + 1));
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    /// An already-closed subscription.
    pub fn closed() -> Self {
        let sub = Self::new();
        sub.unsubscribe();
        sub
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Register a teardown to run on unsubscribe.
    pub fn add<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut teardowns = self.inner.teardowns.lock();
            if !self.is_closed() {
                teardowns.push(Box::new(teardown));
                return;
            }
        }
        teardown();
    }

    /// Unsubscribe `child` when this subscription closes.
    pub fn add_subscription(&self, child: Subscription) {
        self.add(move || child.unsubscribe());
    }

    /// Close the subscription and run its teardowns once.
    pub fn unsubscribe(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let teardowns = std::mem::take(&mut *self.inner.teardowns.lock());
        for teardown in teardowns {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

type Producer<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// A cold, push-based stream.
///
/// Every subscription runs the producer afresh. Delivery is gated: once a
/// terminal notification has been delivered or the subscription has been
/// closed, nothing further reaches the observer.
pub struct Stream<T> {
    producer: Arc<Producer<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Build a stream from a producer that feeds an observer and returns the
    /// subscription that tears it down.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Subscribe with a full observer.
    pub fn subscribe_with(&self, observer: Observer<T>) -> Subscription {
        let outer = Subscription::new();
        let gate = outer.clone();
        let gated = Observer::new(move |notification: Notification<T>| {
            if gate.is_closed() {
                return;
            }
            let terminal = notification.is_terminal();
            observer.notify(notification);
            if terminal {
                gate.unsubscribe();
            }
        });

        let inner = (self.producer)(gated);
        outer.add_subscription(inner);
        outer
    }

    /// Subscribe to values only; errors and completion are ignored.
    pub fn subscribe<F>(&self, next: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe_with(Observer::new(move |notification| {
            if let Notification::Next(value) = notification {
                next(value)
            }
        }))
    }
}
