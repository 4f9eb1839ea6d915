//! Stream constructors and operators.

use super::observable::{Notification, Observer, Stream, Subscription};
use crate::error::BridgeError;
use crate::scheduler::QueueScheduler;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

impl<T: Send + 'static> Stream<T> {
    /// Emit every item of `items` in order, then complete.
    pub fn of(items: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        let items = Arc::new(items);
        Stream::new(move |observer| {
            for item in items.iter() {
                observer.next(item.clone());
            }
            observer.complete();
            Subscription::new()
        })
    }

    /// Complete immediately.
    pub fn empty() -> Self {
        Stream::new(|observer| {
            observer.complete();
            Subscription::new()
        })
    }

    /// Error immediately.
    pub fn fail(error: BridgeError) -> Self {
        Stream::new(move |observer| {
            observer.error(error.clone());
            Subscription::new()
        })
    }

    /// Interleave several streams; completes when all of them have.
    /// The first error from any source ends the merged stream.
    pub fn merge(streams: Vec<Stream<T>>) -> Self {
        let streams = Arc::new(streams);
        Stream::new(move |observer| {
            let sub = Subscription::new();
            if streams.is_empty() {
                observer.complete();
                return sub;
            }

            let active = Arc::new(AtomicUsize::new(streams.len()));
            for stream in streams.iter() {
                let observer = observer.clone();
                let active = Arc::clone(&active);
                let child = stream.subscribe_with(Observer::new(move |notification| {
                    match notification {
                        Notification::Complete => {
                            if active.fetch_sub(1, Ordering::AcqRel) == 1 {
                                observer.complete();
                            }
                        }
                        other => observer.notify(other),
                    }
                }));
                sub.add_subscription(child);
            }
            sub
        })
    }

    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.filter_map(move |value| Some(f(value)))
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_map(move |value| if predicate(&value) { Some(value) } else { None })
    }

    pub fn filter_map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let f = Arc::clone(&f);
            self.subscribe_with(Observer::new(move |notification| match notification {
                Notification::Next(value) => {
                    if let Some(mapped) = f(value) {
                        observer.next(mapped);
                    }
                }
                Notification::Error(e) => observer.error(e),
                Notification::Complete => observer.complete(),
            }))
        })
    }

    /// Map each value to an inner stream and merge every inner stream into
    /// the output. Completes once the source and all inner streams have.
    ///
    /// Inner subscriptions are held by id only while they are live.
    pub fn flat_map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Stream<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let sub = Subscription::new();
            // Source counts as one active member until it completes.
            let active = Arc::new(AtomicUsize::new(1));
            let inners = Arc::new(Mutex::new(HashMap::<u64, Subscription>::new()));
            let next_id = Arc::new(AtomicU64::new(0));

            let live = Arc::clone(&inners);
            sub.add(move || {
                let live: Vec<Subscription> = live.lock().drain().map(|(_, s)| s).collect();
                for inner in live {
                    inner.unsubscribe();
                }
            });

            let f = Arc::clone(&f);
            let outer_active = Arc::clone(&active);
            let outer_inners = Arc::clone(&inners);
            let outer = self.subscribe_with(Observer::new(move |notification| match notification {
                Notification::Next(value) => {
                    outer_active.fetch_add(1, Ordering::AcqRel);
                    let id = next_id.fetch_add(1, Ordering::Relaxed);
                    let observer = observer.clone();
                    let active = Arc::clone(&outer_active);
                    let finished = Arc::clone(&outer_inners);
                    let inner = f(value).subscribe_with(Observer::new(move |n| match n {
                        Notification::Complete => {
                            finished.lock().remove(&id);
                            if active.fetch_sub(1, Ordering::AcqRel) == 1 {
                                observer.complete();
                            }
                        }
                        other => observer.notify(other),
                    }));
                    // A synchronous inner has already completed and released itself.
                    if !inner.is_closed() {
                        outer_inners.lock().insert(id, inner.clone());
                        if inner.is_closed() {
                            outer_inners.lock().remove(&id);
                        }
                    }
                }
                Notification::Error(e) => observer.error(e),
                Notification::Complete => {
                    if outer_active.fetch_sub(1, Ordering::AcqRel) == 1 {
                        observer.complete();
                    }
                }
            }));
            sub.add_subscription(outer);
            sub
        })
    }

    /// Emit at most `count` values, then complete and release the source.
    pub fn take(self, count: usize) -> Self {
        Stream::new(move |observer: Observer<T>| {
            if count == 0 {
                observer.complete();
                return Subscription::closed();
            }
            let remaining = Arc::new(AtomicUsize::new(count));
            self.subscribe_with(Observer::new(move |notification| match notification {
                Notification::Next(value) => {
                    let before = remaining
                        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                            left.checked_sub(1)
                        })
                        .unwrap_or(0);
                    if before > 0 {
                        observer.next(value);
                        if before == 1 {
                            observer.complete();
                        }
                    }
                }
                other => observer.notify(other),
            }))
        })
    }

    /// Deliver every notification through `scheduler`.
    pub fn observe_on(self, scheduler: QueueScheduler) -> Self {
        Stream::new(move |observer: Observer<T>| {
            let scheduler = scheduler.clone();
            self.subscribe_with(Observer::new(move |notification| {
                let observer = observer.clone();
                scheduler.schedule(move || observer.notify(notification));
            }))
        })
    }

    /// Perform the subscription itself as a task on `scheduler`.
    pub fn subscribe_on(self, scheduler: QueueScheduler) -> Self {
        Stream::new(move |observer: Observer<T>| {
            let sub = Subscription::new();
            let pending = sub.clone();
            let source = self.clone();
            scheduler.schedule(move || {
                if pending.is_closed() {
                    return;
                }
                let inner = source.subscribe_with(observer);
                pending.add_subscription(inner);
            });
            sub
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::observable::live_subscriptions;
    use crate::stream::Subject;

    fn collect<T: Send + 'static>(stream: &Stream<T>) -> (Arc<Mutex<Vec<Notification<T>>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let sub = stream.subscribe_with(Observer::new(move |n| s.lock().push(n)));
        (seen, sub)
    }

    #[test]
    fn test_of_map_filter() {
        let stream = Stream::of(vec![1, 2, 3, 4]).filter(|v| v % 2 == 0).map(|v| v * 10);
        let (seen, _sub) = collect(&stream);
        assert_eq!(
            *seen.lock(),
            vec![
                Notification::Next(20),
                Notification::Next(40),
                Notification::Complete
            ]
        );
    }

    #[test]
    fn test_take_releases_source() {
        let subject = Subject::<i32>::new();
        let stream = subject.as_stream().take(2);
        let (seen, sub) = collect(&stream);

        subject.next(1);
        assert_eq!(subject.observer_count(), 1);
        subject.next(2);
        subject.next(3);

        assert_eq!(
            *seen.lock(),
            vec![Notification::Next(1), Notification::Next(2), Notification::Complete]
        );
        assert!(sub.is_closed());
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn test_take_of_synchronous_source() {
        let stream = Stream::of(vec!["a", "b", "c"]).take(1);
        let (seen, _sub) = collect(&stream);
        assert_eq!(*seen.lock(), vec![Notification::Next("a"), Notification::Complete]);
    }

    #[test]
    fn test_merge_completes_after_all_sources() {
        let left = Subject::<&str>::new();
        let right = Subject::<&str>::new();
        let stream = Stream::merge(vec![left.as_stream(), right.as_stream()]);
        let (seen, _sub) = collect(&stream);

        left.next("l1");
        right.next("r1");
        left.complete();
        right.next("r2");
        assert!(!seen.lock().contains(&Notification::Complete));
        right.complete();

        assert_eq!(
            *seen.lock(),
            vec![
                Notification::Next("l1"),
                Notification::Next("r1"),
                Notification::Next("r2"),
                Notification::Complete
            ]
        );
    }

    #[test]
    fn test_flat_map_merges_inner_streams() {
        let source = Subject::<usize>::new();
        let stream = source
            .as_stream()
            .flat_map(|n: usize| Stream::of(vec![n; n]));
        let (seen, _sub) = collect(&stream);

        source.next(1);
        source.next(2);
        source.complete();

        assert_eq!(
            *seen.lock(),
            vec![
                Notification::Next(1),
                Notification::Next(2),
                Notification::Next(2),
                Notification::Complete
            ]
        );
    }

    #[test]
    fn test_flat_map_releases_completed_inners() {
        let source = Subject::<u32>::new();
        let stream = source.as_stream().flat_map(|n: u32| Stream::of(vec![n]));
        let (seen, sub) = collect(&stream);

        let before = live_subscriptions();
        for n in 0..1000 {
            source.next(n);
        }
        assert_eq!(seen.lock().len(), 1000);
        assert_eq!(live_subscriptions(), before);

        sub.unsubscribe();
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn test_flat_map_unsubscribe_releases_live_inners() {
        let source = Subject::<u32>::new();
        let inner = Subject::<u32>::new();
        let i = inner.clone();
        let stream = source.as_stream().flat_map(move |_| i.as_stream());
        let (_seen, sub) = collect(&stream);

        source.next(1);
        source.next(2);
        assert_eq!(inner.observer_count(), 2);

        sub.unsubscribe();
        assert_eq!(inner.observer_count(), 0);
    }

    #[test]
    fn test_flat_map_inner_error_ends_output() {
        let source = Subject::<i32>::new();
        let stream = source.as_stream().flat_map(|n: i32| {
            if n < 0 {
                Stream::fail(BridgeError::Stream("negative".to_string()))
            } else {
                Stream::of(vec![n])
            }
        });
        let (seen, sub) = collect(&stream);

        source.next(1);
        source.next(-1);
        source.next(2);

        assert_eq!(
            *seen.lock(),
            vec![
                Notification::Next(1),
                Notification::Error(BridgeError::Stream("negative".to_string()))
            ]
        );
        assert!(sub.is_closed());
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn test_observe_on_defers_inside_running_task() {
        let scheduler = QueueScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let stream = Stream::of(vec![1, 2]).observe_on(scheduler.clone());
        let (s, l) = (stream.clone(), Arc::clone(&log));
        scheduler.schedule(move || {
            let inner = Arc::clone(&l);
            s.subscribe(move |v| inner.lock().push(format!("value {}", v)));
            l.lock().push("subscribed".to_string());
        });

        assert_eq!(
            *log.lock(),
            vec!["subscribed".to_string(), "value 1".to_string(), "value 2".to_string()]
        );
    }

    #[test]
    fn test_subscribe_on_can_be_cancelled_before_running() {
        let scheduler = QueueScheduler::new();
        let subject = Subject::<i32>::new();
        let stream = subject.as_stream().subscribe_on(scheduler.clone());

        let st = stream.clone();
        scheduler.schedule(move || {
            let sub = st.subscribe(|_| {});
            sub.unsubscribe();
        });

        assert_eq!(subject.observer_count(), 0);
    }
}
