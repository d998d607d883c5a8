#![forbid(unsafe_code)]

//! Reactive primitives for the weft runtime.
//!
//! - [`ValueCell`]: a shared, observable value holder with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`ObservableList`]: an ordered collection emitting structural
//!   [`ListChange`] events (insert/remove/update).
//! - [`CellBackedList`]: an immutable, change-aware list backed by N
//!   independent cells; value changes surface as single-element updates.
//! - [`TimedListener`]: coalesces bursts of events within a quiescence
//!   window into a single downstream invocation.
//!
//! # Architecture
//!
//! `ValueCell<T>` and `ObservableList<T>` use `Rc<RefCell<..>>` for
//! single-threaded shared ownership. Notification is synchronous: a write
//! notifies every listener before the call returns, and listeners may
//! recursively write other cells. Borrows are released before callbacks run,
//! so re-entrant writes do not panic.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Setting a cell to a value equal to the current one is a no-op.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 4. Structural list changes carry enough information (`from`, removed and
//!    added items, old/new values) to replicate the change elsewhere.

pub mod cell;
pub mod debounce;
pub mod list;
pub mod value_list;

pub use cell::{Subscription, ValueCell};
pub use debounce::TimedListener;
pub use list::{ListChange, ObservableList};
pub use value_list::{CellBackedList, ListenerHandle};

use thiserror::Error;

/// Errors raised by collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Structural mutation attempted on an immutable list.
    #[error("list is immutable")]
    Immutable,
}
