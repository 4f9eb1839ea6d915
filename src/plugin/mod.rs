//! The epic plugin: binds a store, registers epics and routes their output.
//!
//! Lifecycle:
//! 1. Construct an [`EpicPlugin`] from a [`PluginConfig`].
//! 2. [`install`](EpicPlugin::install) it on a store, receiving the
//!    decorating [`EpicStore`] to use from then on.
//! 3. Register epics with [`run`](EpicPlugin::run). Epics registered before
//!    install are queued and registered when the store is bound.
//!
//! Every epic output is merged into one aggregated stream whose items are
//! routed to `dispatch` (structured actions with `is_action`), `commit`
//! (everything else) or dropped (the [`NOOP`](crate::NOOP) sentinel).

mod config;
mod epic;
mod intercept;
mod router;

pub use config::{PluginConfig, PluginOptions};
pub use epic::Epic;
pub use intercept::EpicStore;

use crate::channels::{ActionView, StateView};
use crate::error::{BridgeError, Result};
use crate::scheduler::QueueScheduler;
use crate::store::Store;
use crate::stream::{Stream, Subject, Subscription};
use crate::types::Action;
use parking_lot::{Mutex, RwLock};
use router::Router;
use std::sync::Arc;
use tracing::{debug, warn};

/// Wiring created when a store is bound.
struct Binding<S> {
    outputs: Subject<Stream<Action>>,
    actions: ActionView,
    states: StateView<S>,
    aggregate: Subscription,
}

impl<S> Clone for Binding<S> {
    fn clone(&self) -> Self {
        Self {
            outputs: self.outputs.clone(),
            actions: self.actions.clone(),
            states: self.states.clone(),
            aggregate: self.aggregate.clone(),
        }
    }
}

/// Bridges one store to any number of epics.
pub struct EpicPlugin<S, D = ()> {
    config: PluginConfig<D>,
    scheduler: QueueScheduler,
    bindings: RwLock<Vec<Binding<S>>>,
    pending: Mutex<Vec<Epic<S, D>>>,
    failure: Arc<Mutex<Option<BridgeError>>>,
}

impl<S, D> EpicPlugin<S, D>
where
    S: Clone + Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    /// Build a plugin from options.
    ///
    /// Fails with [`BridgeError::RootEpicAsConfig`] when given an epic in place
    /// of a configuration.
    pub fn new(options: impl Into<PluginOptions<S, D>>) -> Result<Self> {
        match options.into() {
            PluginOptions::Config(config) => Ok(Self::with_config(config)),
            PluginOptions::RootEpic(_) => Err(BridgeError::RootEpicAsConfig),
        }
    }

    pub fn with_config(config: PluginConfig<D>) -> Self {
        Self {
            config,
            scheduler: QueueScheduler::new(),
            bindings: RwLock::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Bind `store` and return the decorated handle.
    ///
    /// Epics queued by earlier `run` calls are registered here; if any of them
    /// returns no stream, nothing is bound, the offending epic is dropped and
    /// the error is returned. Binding a second store is allowed but logged;
    /// epics registered afterwards run against every bound store.
    pub fn install<St>(&self, store: Arc<St>) -> Result<EpicStore<St>>
    where
        St: Store<State = S>,
    {
        if self.config.protocol_warnings && self.is_bound() {
            warn!(
                "this plugin is already associated with a store; \
                 create one EpicPlugin per store"
            );
        }

        let epic_store = EpicStore::new(store, self.scheduler.clone());
        let actions = epic_store.action_view();
        let states = epic_store.state_view();

        let queued = std::mem::take(&mut *self.pending.lock());
        let mut outputs = Vec::with_capacity(queued.len());
        for (index, epic) in queued.iter().enumerate() {
            match epic.invoke(&actions, &states, self.config.dependencies.as_ref()) {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    let mut pending = self.pending.lock();
                    let keep = queued
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != index)
                        .map(|(_, epic)| epic.clone());
                    // Anything queued while we were invoking stays behind ours.
                    let later = std::mem::take(&mut *pending);
                    pending.extend(keep);
                    pending.extend(later);
                    return Err(e);
                }
            }
        }

        let binding = self.bind(&epic_store, actions, states);
        for output in outputs {
            binding.outputs.next(output);
        }
        debug!(epics = queued.len(), "plugin installed");
        Ok(epic_store)
    }

    fn bind<St>(
        &self,
        epic_store: &EpicStore<St>,
        actions: ActionView,
        states: StateView<S>,
    ) -> Binding<S>
    where
        St: Store<State = S>,
    {
        let outputs: Subject<Stream<Action>> = Subject::new();
        let scheduler = self.scheduler.clone();
        let router = Router::new(epic_store.downgrade(), Arc::clone(&self.failure));

        let aggregate = outputs
            .as_stream()
            .flat_map(move |output: Stream<Action>| {
                output
                    .subscribe_on(scheduler.clone())
                    .observe_on(scheduler.clone())
            })
            .subscribe_with(router.into_observer());

        let binding = Binding {
            outputs,
            actions,
            states,
            aggregate,
        };
        self.bindings.write().push(binding.clone());
        binding
    }

    /// Register an epic function.
    pub fn run<F>(&self, f: F) -> Result<()>
    where
        F: Fn(&ActionView, &StateView<S>, Option<&D>) -> Option<Stream<Action>>
            + Send
            + Sync
            + 'static,
    {
        self.run_epic(Epic::new(f))
    }

    /// Register an epic function under a name used in errors and logs.
    pub fn run_named<F>(&self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&ActionView, &StateView<S>, Option<&D>) -> Option<Stream<Action>>
            + Send
            + Sync
            + 'static,
    {
        self.run_epic(Epic::named(name, f))
    }

    /// Register an epic.
    ///
    /// When bound, the epic is invoked once per bound store and a missing
    /// output is returned as [`BridgeError::MissingOutput`] before any output
    /// is routed. Before install, the epic is queued and a protocol warning is
    /// logged.
    pub fn run_epic(&self, epic: Epic<S, D>) -> Result<()> {
        // Clone out of the lock: epics may call `run` themselves.
        let bindings = self.bindings.read().clone();
        if bindings.is_empty() {
            if self.config.protocol_warnings {
                warn!(
                    epic = epic.name(),
                    "EpicPlugin::run called before the plugin was installed on a store; \
                     the epic is queued until install"
                );
            }
            self.pending.lock().push(epic);
            return Ok(());
        }

        let mut outputs = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            if binding.aggregate.is_closed() && self.config.protocol_warnings {
                warn!(
                    epic = epic.name(),
                    "epic output aggregation has stopped; the epic will not be routed"
                );
            }
            let output = epic.invoke(
                &binding.actions,
                &binding.states,
                self.config.dependencies.as_ref(),
            )?;
            outputs.push(output);
        }

        debug!(epic = epic.name(), stores = bindings.len(), "epic registered");
        for (binding, output) in bindings.iter().zip(outputs) {
            binding.outputs.next(output);
        }
        Ok(())
    }

    /// Whether a store has been bound.
    pub fn is_bound(&self) -> bool {
        !self.bindings.read().is_empty()
    }

    /// Number of epics waiting for install.
    pub fn pending_epics(&self) -> usize {
        self.pending.lock().len()
    }

    /// The error that stopped the aggregated output, if any.
    pub fn failure(&self) -> Option<BridgeError> {
        self.failure.lock().clone()
    }

    pub fn config(&self) -> &PluginConfig<D> {
        &self.config
    }
}

impl<S, D> Default for EpicPlugin<S, D>
where
    S: Clone + Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_config(PluginConfig::default())
    }
}
