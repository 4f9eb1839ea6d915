//! Store interception: the decorating store that feeds the dual channel.

use crate::channels::{ActionView, DualChannel, StateView};
use crate::error::Result;
use crate::scheduler::QueueScheduler;
use crate::store::Store;
use crate::types::Action;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::trace;

pub(crate) struct Intercepted<St: Store> {
    store: Arc<St>,
    channel: DualChannel<St::State>,
}

impl<St: Store> Intercepted<St> {
    /// Publish first so epics see actions with no store handler, then
    /// forward only registered names. The handler commits on the wrapped
    /// store, so the state it leaves behind is published afterwards.
    pub(crate) fn dispatch_action(&self, action: Action) -> Result<()> {
        self.channel.publish_action(action.clone());

        if !self.store.has_action(action.action_type()) {
            trace!(action = action.action_type(), "no action handler registered; swallowed");
            return Ok(());
        }

        let (action_type, payload) = action.into_parts();
        let result = self.store.dispatch(&action_type, payload);
        self.channel.publish_state(self.store.state());
        result
    }

    /// Forward registered mutations, then publish the post-mutation state.
    /// Unregistered names do nothing at all.
    pub(crate) fn commit_action(&self, action: Action) -> Result<()> {
        if !self.store.has_mutation(action.action_type()) {
            trace!(mutation = action.action_type(), "no mutation registered; swallowed");
            return Ok(());
        }

        let (mutation_type, payload) = action.into_parts();
        self.store.commit(&mutation_type, payload)?;
        self.channel.publish_state(self.store.state());
        Ok(())
    }
}

/// A store wrapped by an [`EpicPlugin`](super::EpicPlugin).
///
/// Use this handle in place of the original store: its `dispatch` publishes
/// onto the action channel and its `commit` publishes the resulting state.
/// It implements [`Store`] itself, delegating to the wrapped store.
pub struct EpicStore<St: Store> {
    inner: Arc<Intercepted<St>>,
}

impl<St: Store> Clone for EpicStore<St> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<St: Store> EpicStore<St> {
    pub(crate) fn new(store: Arc<St>, scheduler: QueueScheduler) -> Self {
        let channel = DualChannel::new(store.state(), scheduler);
        Self {
            inner: Arc::new(Intercepted { store, channel }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Intercepted<St>> {
        Arc::downgrade(&self.inner)
    }

    /// Dispatch a bare name, a `(name, payload)` pair or a structured action.
    pub fn dispatch_action(&self, action: impl Into<Action>) -> Result<()> {
        self.inner.dispatch_action(action.into())
    }

    /// Commit a bare name, a `(name, payload)` pair or a structured action.
    pub fn commit_action(&self, action: impl Into<Action>) -> Result<()> {
        self.inner.commit_action(action.into())
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<St> {
        &self.inner.store
    }

    pub fn action_view(&self) -> ActionView {
        self.inner.channel.action_view()
    }

    pub fn state_view(&self) -> StateView<St::State> {
        self.inner.channel.state_view()
    }
}

impl<St: Store> Store for EpicStore<St> {
    type State = St::State;

    fn state(&self) -> Self::State {
        self.inner.store.state()
    }

    fn dispatch(&self, action_type: &str, payload: Value) -> Result<()> {
        self.dispatch_action(Action::named_with(action_type, payload))
    }

    fn commit(&self, mutation_type: &str, payload: Value) -> Result<()> {
        self.commit_action(Action::named_with(mutation_type, payload))
    }

    fn has_action(&self, name: &str) -> bool {
        self.inner.store.has_action(name)
    }

    fn has_mutation(&self, name: &str) -> bool {
        self.inner.store.has_mutation(name)
    }
}
