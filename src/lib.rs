//! # Epic Bridge
//!
//! Drives a mutation-based state store from long-lived reactive processes
//! ("epics"). An epic reads a stream of dispatched actions and a stream of
//! post-mutation state snapshots, and emits outputs that are fed back into
//! the store.
//!
//! ## Core Concepts
//!
//! - **Ordering scheduler**: one FIFO, non-reentrant queue per plugin through
//!   which every propagation step runs
//! - **Dual channel**: action and state broadcasts, exposed to epics as
//!   read-only views
//! - **Aggregation**: every registered epic's output merged into one stream
//! - **Routing**: structured actions marked `is_action` are dispatched,
//!   other outputs are committed, and the [`NOOP`] sentinel is dropped
//! - **Interception**: [`EpicStore`] decorates any [`Store`], publishing
//!   actions before dispatch and state after each commit
//!
//! ## Example
//!
//! ```ignore
//! use epic_bridge::{Action, EpicPlugin, MemoryStore, PluginConfig, Store};
//! use std::sync::Arc;
//!
//! let store = MemoryStore::builder(0i64)
//!     .mutation("increment", |count, _| *count += 1)
//!     .build();
//!
//! let plugin: EpicPlugin<i64> = EpicPlugin::with_config(PluginConfig::default());
//! let store = plugin.install(Arc::new(store))?;
//!
//! // Every "clicked" action commits an increment.
//! plugin.run(|actions, _state, _deps| {
//!     Some(actions.of_type(&["clicked"]).map(|_| Action::named("increment")))
//! })?;
//!
//! store.dispatch_action("clicked")?;
//! assert_eq!(store.state(), 1);
//! ```

pub mod channels;
pub mod error;
pub mod plugin;
pub mod scheduler;
pub mod store;
pub mod stream;
pub mod types;

// Re-exports
pub use channels::{ActionView, DualChannel, StateView, Tap};
pub use error::{BridgeError, Result};
pub use plugin::{Epic, EpicPlugin, EpicStore, PluginConfig, PluginOptions};
pub use scheduler::QueueScheduler;
pub use store::{MemoryStore, MemoryStoreBuilder, Store};
pub use stream::{Notification, Observer, Stream, Subject, Subscription};
pub use types::{route, Action, Route, NOOP};
