//! In-memory store with named mutation and action handlers.

use super::Store;
use crate::error::{BridgeError, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

type Mutation<S> = Box<dyn Fn(&mut S, &Value) + Send + Sync>;
type ActionHandler<S> = Box<dyn Fn(&MemoryStore<S>, &Value) -> Result<()> + Send + Sync>;

/// A store keeping its state behind a lock.
///
/// Mutations change state synchronously. Actions receive the store itself
/// and usually commit one or more mutations.
pub struct MemoryStore<S> {
    state: RwLock<S>,
    mutations: HashMap<String, Mutation<S>>,
    actions: HashMap<String, ActionHandler<S>>,
    commits: AtomicU64,
    dispatches: AtomicU64,
}

impl<S: Clone + Send + Sync + 'static> MemoryStore<S> {
    pub fn builder(initial: S) -> MemoryStoreBuilder<S> {
        MemoryStoreBuilder {
            initial,
            mutations: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Number of mutations that have run.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Number of action handlers that have run.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::SeqCst)
    }
}

impl<S: Clone + Send + Sync + 'static> Store for MemoryStore<S> {
    type State = S;

    fn state(&self) -> S {
        self.state.read().clone()
    }

    fn dispatch(&self, action_type: &str, payload: Value) -> Result<()> {
        let handler = self
            .actions
            .get(action_type)
            .ok_or_else(|| BridgeError::Store(format!("unknown action: {}", action_type)))?;
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        handler(self, &payload)
    }

    fn commit(&self, mutation_type: &str, payload: Value) -> Result<()> {
        let mutation = self
            .mutations
            .get(mutation_type)
            .ok_or_else(|| BridgeError::Store(format!("unknown mutation: {}", mutation_type)))?;
        {
            let mut state = self.state.write();
            mutation(&mut *state, &payload);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    fn has_mutation(&self, name: &str) -> bool {
        self.mutations.contains_key(name)
    }
}

/// Registers handlers before the store is built.
pub struct MemoryStoreBuilder<S> {
    initial: S,
    mutations: HashMap<String, Mutation<S>>,
    actions: HashMap<String, ActionHandler<S>>,
}

impl<S: Clone + Send + Sync + 'static> MemoryStoreBuilder<S> {
    pub fn mutation<F>(mut self, name: &str, mutation: F) -> Self
    where
        F: Fn(&mut S, &Value) + Send + Sync + 'static,
    {
        self.mutations.insert(name.to_string(), Box::new(mutation));
        self
    }

    pub fn action<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&MemoryStore<S>, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.actions.insert(name.to_string(), Box::new(handler));
        self
    }

    pub fn build(self) -> MemoryStore<S> {
        MemoryStore {
            state: RwLock::new(self.initial),
            mutations: self.mutations,
            actions: self.actions,
            commits: AtomicU64::new(0),
            dispatches: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counter() -> MemoryStore<i64> {
        MemoryStore::builder(0i64)
            .mutation("add", |state, payload| *state += payload.as_i64().unwrap_or(1))
            .action("add_twice", |store, payload| {
                store.commit("add", payload.clone())?;
                store.commit("add", payload.clone())
            })
            .build()
    }

    #[test]
    fn test_commit_runs_mutation() {
        let store = counter();
        store.commit("add", json!(5)).unwrap();
        assert_eq!(store.state(), 5);
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_dispatch_runs_action() {
        let store = counter();
        store.dispatch("add_twice", json!(2)).unwrap();
        assert_eq!(store.state(), 4);
        assert_eq!(store.dispatch_count(), 1);
        assert_eq!(store.commit_count(), 2);
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let store = counter();
        assert!(matches!(
            store.commit("missing", Value::Null),
            Err(BridgeError::Store(_))
        ));
        assert!(matches!(
            store.dispatch("missing", Value::Null),
            Err(BridgeError::Store(_))
        ));
        assert!(store.has_mutation("add"));
        assert!(!store.has_action("add"));
    }
}
