//! Minimal push-based stream layer.
//!
//! Just enough of a reactive runtime for the bridge:
//! - Cold [`Stream`]s built from producers, with gated delivery
//! - Hot [`Subject`]s for broadcasting
//! - Operators epics need to be useful (`map`, `filter`, `flat_map`, `merge`, `take`)
//! - Scheduler hand-off via `observe_on` / `subscribe_on`
//!
//! # Example
//!
//! ```ignore
//! let subject = Subject::new();
//! let doubled = subject.as_stream().map(|n: i32| n * 2);
//! let sub = doubled.subscribe(|n| println!("{}", n));
//! subject.next(21);
//! sub.unsubscribe();
//! ```

mod observable;
mod operators;
mod subject;

pub use observable::{Notification, Observer, Stream, Subscription};
pub use subject::Subject;
