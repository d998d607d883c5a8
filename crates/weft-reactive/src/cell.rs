//! Observable value cells.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct CellSubscriber<T> {
    id: u64,
    callback: Rc<dyn Fn(&T, &T)>,
}

struct CellInner<T> {
    value: T,
    writable: bool,
    next_id: u64,
    subscribers: Vec<CellSubscriber<T>>,
}

/// A shared, observable value holder.
///
/// Cloning a `ValueCell` yields another handle onto the same value; writes
/// through any handle notify all subscribers synchronously, in registration
/// order, with `(old, new)`.
///
/// A cell carries an advisory writability flag (see [`ValueCell::read_only`]).
/// The flag does not prevent writes through an owning handle — it tells
/// consumers such as the binding engine that they must not push values into
/// this cell, mirroring a read-only property whose owner can still mutate it
/// internally.
pub struct ValueCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ValueCell")
            .field("value", &inner.value)
            .field("writable", &inner.writable)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> ValueCell<T> {
    /// Create a writable cell with an initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_writability(value, true)
    }

    /// Create a cell whose writability flag is off.
    #[must_use]
    pub fn read_only(value: T) -> Self {
        Self::with_writability(value, false)
    }

    fn with_writability(value: T, writable: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                writable,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Whether consumers may push values into this cell.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.inner.borrow().writable
    }

    /// Set a new value, notifying subscribers with `(old, new)`.
    ///
    /// Setting a value equal to the current one is a no-op: no notification
    /// fires. Listeners run after the internal borrow is released, so they
    /// may recursively read or write this or other cells.
    pub fn set(&self, value: T) {
        let (old, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            let old = std::mem::replace(&mut inner.value, value.clone());
            let callbacks: Vec<_> = inner
                .subscribers
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();
            (old, callbacks)
        };
        for callback in callbacks {
            callback(&old, &value);
        }
    }

    /// Subscribe to changes. The callback receives `(old, new)`.
    ///
    /// The returned [`Subscription`] unsubscribes on drop.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T, &T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(CellSubscriber {
                id,
                callback: Rc::new(callback),
            });
            id
        };
        let weak: Weak<RefCell<CellInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.retain(|s| s.id != id);
            }
        })
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Whether two handles refer to the same underlying cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// RAII guard for a subscriber registration.
///
/// Dropping the guard (or calling [`unsubscribe`]) removes the callback
/// before the next notification cycle.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation closure.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the subscription now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_set_round_trip() {
        let cell = ValueCell::new(1);
        assert_eq!(cell.get(), 1);
        cell.set(5);
        assert_eq!(cell.get(), 5);
    }

    #[test]
    fn subscribers_see_old_and_new() {
        let cell = ValueCell::new(10);
        let seen = Rc::new(Cell::new((0, 0)));
        let s = Rc::clone(&seen);
        let _sub = cell.subscribe(move |old, new| s.set((*old, *new)));

        cell.set(42);
        assert_eq!(seen.get(), (10, 42));
    }

    #[test]
    fn equal_value_is_a_noop() {
        let cell = ValueCell::new("a".to_string());
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        let _sub = cell.subscribe(move |_, _| f.set(f.get() + 1));

        cell.set("a".to_string());
        assert_eq!(fired.get(), 0, "equal value must not notify");
        cell.set("b".to_string());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn notification_is_synchronous_and_recursive() {
        let a = ValueCell::new(0);
        let b = ValueCell::new(0);
        let b_clone = b.clone();
        let _sub = a.subscribe(move |_, new| b_clone.set(*new * 2));

        a.set(3);
        assert_eq!(b.get(), 6, "listener writes must land before set returns");
    }

    #[test]
    fn drop_unsubscribes() {
        let cell = ValueCell::new(0);
        let fired = Rc::new(Cell::new(0));
        {
            let f = Rc::clone(&fired);
            let _sub = cell.subscribe(move |_, _| f.set(f.get() + 1));
            cell.set(1);
        }
        cell.set(2);
        assert_eq!(fired.get(), 1, "callback must not fire after guard drop");
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn explicit_unsubscribe() {
        let cell = ValueCell::new(0);
        let sub = cell.subscribe(|_, _| {});
        assert_eq!(cell.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn read_only_flag_is_advisory() {
        let cell = ValueCell::read_only(7);
        assert!(!cell.is_writable());
        cell.set(9);
        assert_eq!(cell.get(), 9, "the owner may still mutate a read-only cell");
    }

    #[test]
    fn clones_share_state() {
        let a = ValueCell::new(1);
        let b = a.clone();
        b.set(2);
        assert_eq!(a.get(), 2);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn subscribers_notified_in_registration_order() {
        let cell = ValueCell::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let l2 = Rc::clone(&log);
        let _s1 = cell.subscribe(move |_, _| l1.borrow_mut().push(1));
        let _s2 = cell.subscribe(move |_, _| l2.borrow_mut().push(2));

        cell.set(1);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}
