//! Observable ordered collections.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Subscription;

/// A structural change to an [`ObservableList`].
///
/// Every variant carries enough information for a listener to replicate the
/// change onto another ordered collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<T> {
    /// `items` were inserted starting at position `from`.
    Inserted { from: usize, items: Vec<T> },
    /// `items` were removed starting at position `from`.
    Removed { from: usize, items: Vec<T> },
    /// The element at `index` changed value in place.
    Updated { index: usize, old: T, new: T },
}

struct ListSubscriber<T> {
    id: u64,
    callback: Rc<dyn Fn(&ListChange<T>)>,
}

struct InvalidationSubscriber {
    id: u64,
    callback: Rc<dyn Fn()>,
}

struct ListInner<T> {
    items: Vec<T>,
    next_id: u64,
    subscribers: Vec<ListSubscriber<T>>,
    invalidation: Vec<InvalidationSubscriber>,
}

/// A shared, ordered collection with structural change notification.
///
/// Cloning yields another handle onto the same list. Mutations notify change
/// subscribers synchronously with a [`ListChange`], then invalidation
/// subscribers. Borrows are released before callbacks run, so listeners may
/// recursively mutate other lists (or, carefully, this one).
pub struct ObservableList<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &self.inner.borrow().items)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list seeded with `items`.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                items,
                next_id: 0,
                subscribers: Vec::new(),
                invalidation: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Clone out the element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().items.get(index).cloned()
    }

    /// Snapshot of the current contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner.borrow().items.contains(item)
    }

    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.borrow().items.iter().position(|i| i == item)
    }

    /// Append an element.
    pub fn push(&self, item: T) {
        let from = self.len();
        self.insert(from, item);
    }

    /// Insert an element at `index`.
    pub fn insert(&self, index: usize, item: T) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.items.insert(index, item.clone());
        }
        self.notify(&ListChange::Inserted {
            from: index,
            items: vec![item],
        });
    }

    /// Insert several elements starting at `index`.
    pub fn insert_all(&self, index: usize, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            for (offset, item) in items.iter().enumerate() {
                inner.items.insert(index + offset, item.clone());
            }
        }
        self.notify(&ListChange::Inserted { from: index, items });
    }

    /// Remove and return the element at `index`, if any.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if index >= inner.items.len() {
                return None;
            }
            inner.items.remove(index)
        };
        self.notify(&ListChange::Removed {
            from: index,
            items: vec![removed.clone()],
        });
        Some(removed)
    }

    /// Remove the first occurrence of `item`. Returns whether anything was
    /// removed.
    pub fn remove_item(&self, item: &T) -> bool {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_some(),
            None => false,
        }
    }

    /// Remove a contiguous range `[from, to)`.
    pub fn remove_range(&self, from: usize, to: usize) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let to = to.min(inner.items.len());
            if from >= to {
                return;
            }
            inner.items.drain(from..to).collect::<Vec<_>>()
        };
        self.notify(&ListChange::Removed {
            from,
            items: removed,
        });
    }

    /// Remove all elements.
    pub fn clear(&self) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            std::mem::take(&mut inner.items)
        };
        if removed.is_empty() {
            return;
        }
        self.notify(&ListChange::Removed {
            from: 0,
            items: removed,
        });
    }

    /// Replace the whole contents. Emits a removal of the old contents
    /// followed by an insertion of the new ones.
    pub fn set_all(&self, items: Vec<T>) {
        self.clear();
        if items.is_empty() {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.items = items.clone();
        }
        self.notify(&ListChange::Inserted { from: 0, items });
    }

    /// Replace the element at `index`, emitting an update event.
    pub fn set(&self, index: usize, item: T) {
        let old = {
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.items.get_mut(index) else {
                return;
            };
            if *slot == item {
                return;
            }
            std::mem::replace(slot, item.clone())
        };
        self.notify(&ListChange::Updated {
            index,
            old,
            new: item,
        });
    }

    /// Subscribe to structural changes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&ListChange<T>) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(ListSubscriber {
                id,
                callback: Rc::new(callback),
            });
            id
        };
        let weak: Weak<RefCell<ListInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.retain(|s| s.id != id);
            }
        })
    }

    /// Subscribe to invalidation (any change, without detail).
    #[must_use]
    pub fn subscribe_invalidation(&self, callback: impl Fn() + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.invalidation.push(InvalidationSubscriber {
                id,
                callback: Rc::new(callback),
            });
            id
        };
        let weak: Weak<RefCell<ListInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().invalidation.retain(|s| s.id != id);
            }
        })
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Whether two handles refer to the same underlying list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self, change: &ListChange<T>) {
        let (callbacks, invalidation) = {
            let inner = self.inner.borrow();
            let callbacks: Vec<_> = inner
                .subscribers
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();
            let invalidation: Vec<_> = inner
                .invalidation
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();
            (callbacks, invalidation)
        };
        for callback in callbacks {
            callback(change);
        }
        for callback in invalidation {
            callback();
        }
    }
}
