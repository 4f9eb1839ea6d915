//! Hot multicast publish point.

use super::observable::{Notification, Observer, Stream, Subscription};
use crate::error::BridgeError;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct SubjectInner<T> {
    observers: RwLock<Vec<(u64, Observer<T>)>>,
    next_id: AtomicU64,
    stopped: RwLock<Option<Notification<T>>>,
}

/// Broadcasts every pushed value to the observers subscribed at push time.
///
/// Observers that subscribe later never see earlier values. After `error`
/// or `complete`, new subscribers receive only that terminal notification.
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                observers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                stopped: RwLock::new(None),
            }),
        }
    }

    pub fn next(&self, value: T) {
        if self.inner.stopped.read().is_some() {
            return;
        }
        // Snapshot first: observers may subscribe or unsubscribe while we deliver.
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.next(value.clone());
        }
    }

    pub fn error(&self, error: BridgeError) {
        self.stop(Notification::Error(error));
    }

    pub fn complete(&self) {
        self.stop(Notification::Complete);
    }

    fn stop(&self, notification: Notification<T>) {
        {
            let mut stopped = self.inner.stopped.write();
            if stopped.is_some() {
                return;
            }
            *stopped = Some(notification.clone());
        }
        let observers = std::mem::take(&mut *self.inner.observers.write());
        for (_, observer) in observers {
            observer.notify(notification.clone());
        }
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    /// A stream view of this subject.
    pub fn as_stream(&self) -> Stream<T> {
        let inner = Arc::clone(&self.inner);
        Stream::new(move |observer: Observer<T>| {
            let stopped = inner.stopped.read().clone();
            if let Some(terminal) = stopped {
                observer.notify(terminal);
                return Subscription::closed();
            }

            let id = inner.next_id.fetch_add(1, Ordering::SeqCst);
            inner.observers.write().push((id, observer));

            let sub = Subscription::new();
            let weak = Arc::downgrade(&inner);
            sub.add(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.observers.write().retain(|(oid, _)| *oid != id);
                }
            });
            sub
        })
    }

    /// An observer that pushes into this subject.
    pub fn observer(&self) -> Observer<T> {
        let subject = self.clone();
        Observer::new(move |notification| match notification {
            Notification::Next(value) => subject.next(value),
            Notification::Error(e) => subject.error(e),
            Notification::Complete => subject.complete(),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}
