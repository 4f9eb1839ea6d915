//! Dual channel: ordered action and state broadcasts.
//!
//! Every dispatched action and every post-mutation state snapshot is pushed
//! onto its channel and delivered through the plugin's ordering scheduler.
//! Epics receive read-only projections:
//! - [`ActionView`]: all actions, or only selected types via `of_type`
//! - [`StateView`]: state snapshots plus a synchronous `value()`
//!
//! Views are hot: a subscriber sees only what is published after it
//! subscribed, and nothing is buffered beyond the scheduler queue
//! (a [`Tap`] buffers on the reading side).

mod tap;
mod views;

pub use tap::Tap;
pub use views::{ActionView, DualChannel, StateView};
