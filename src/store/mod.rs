//! The store collaborator contract.
//!
//! The bridge does not own state. It decorates any type implementing
//! [`Store`]: something holding current state, dispatching registered
//! actions by name, committing registered mutations by name, and able to
//! say which names are registered.

mod memory;

pub use memory::{MemoryStore, MemoryStoreBuilder};

use crate::error::Result;
use serde_json::Value;

/// A mutation-based state store.
pub trait Store: Send + Sync + 'static {
    /// Snapshot type handed to epics. Cloning should be cheap
    /// (an `Arc` or small value); the bridge clones it on every commit.
    type State: Clone + Send + Sync + 'static;

    /// Current state.
    fn state(&self) -> Self::State;

    /// Run the action handler registered under `action_type`.
    fn dispatch(&self, action_type: &str, payload: Value) -> Result<()>;

    /// Run the mutation registered under `mutation_type`.
    fn commit(&self, mutation_type: &str, payload: Value) -> Result<()>;

    /// Whether an action handler is registered under `name`.
    fn has_action(&self, name: &str) -> bool;

    /// Whether a mutation is registered under `name`.
    fn has_mutation(&self, name: &str) -> bool;
}
