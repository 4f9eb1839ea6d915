//! The dual channel and the read-only views handed to epics.

use super::tap::Tap;
use crate::scheduler::QueueScheduler;
use crate::stream::{Stream, Subject};
use crate::types::Action;
use parking_lot::RwLock;
use std::sync::Arc;

/// Action and state publish points, both delivering through one scheduler.
pub struct DualChannel<S> {
    actions: Subject<Action>,
    states: Subject<S>,
    latest: Arc<RwLock<S>>,
    scheduler: QueueScheduler,
}

impl<S: Clone + Send + Sync + 'static> DualChannel<S> {
    /// Create channels whose state view starts at `initial`.
    pub fn new(initial: S, scheduler: QueueScheduler) -> Self {
        Self {
            actions: Subject::new(),
            states: Subject::new(),
            latest: Arc::new(RwLock::new(initial)),
            scheduler,
        }
    }

    /// Publish an action to every current action subscriber.
    pub fn publish_action(&self, action: Action) {
        let actions = self.actions.clone();
        self.scheduler.schedule(move || actions.next(action));
    }

    /// Record `state` as the latest value, then publish it.
    pub fn publish_state(&self, state: S) {
        *self.latest.write() = state.clone();
        let states = self.states.clone();
        self.scheduler.schedule(move || states.next(state));
    }

    pub fn action_view(&self) -> ActionView {
        ActionView {
            stream: self
                .actions
                .as_stream()
                .observe_on(self.scheduler.clone()),
        }
    }

    pub fn state_view(&self) -> StateView<S> {
        StateView {
            stream: self.states.as_stream().observe_on(self.scheduler.clone()),
            latest: Arc::clone(&self.latest),
        }
    }

    pub fn scheduler(&self) -> &QueueScheduler {
        &self.scheduler
    }

    /// Number of observers currently on the action channel.
    pub fn action_observers(&self) -> usize {
        self.actions.observer_count()
    }

    /// Number of observers currently on the state channel.
    pub fn state_observers(&self) -> usize {
        self.states.observer_count()
    }
}

/// Read-only view of dispatched actions.
#[derive(Clone)]
pub struct ActionView {
    stream: Stream<Action>,
}

impl ActionView {
    /// All actions published after subscription.
    pub fn stream(&self) -> Stream<Action> {
        self.stream.clone()
    }

    /// Only actions whose type is one of `types`.
    pub fn of_type(&self, types: &[&str]) -> Stream<Action> {
        let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        self.stream
            .clone()
            .filter(move |action| types.iter().any(|t| t == action.action_type()))
    }

    /// Pull handle over this view.
    pub fn tap(&self) -> Tap<Action> {
        Tap::new(&self.stream)
    }
}

/// Read-only view of post-mutation state snapshots.
pub struct StateView<S> {
    stream: Stream<S>,
    latest: Arc<RwLock<S>>,
}

impl<S> Clone for StateView<S> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
            latest: Arc::clone(&self.latest),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> StateView<S> {
    /// Latest published state, or the bind-time state if nothing was published.
    pub fn value(&self) -> S {
        self.latest.read().clone()
    }

    /// Snapshots published after subscription.
    pub fn stream(&self) -> Stream<S> {
        self.stream.clone()
    }

    /// Pull handle over this view.
    pub fn tap(&self) -> Tap<S> {
        Tap::new(&self.stream)
    }
}
