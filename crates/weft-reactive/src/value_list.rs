//! An immutable, change-aware list backed by independent cells.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{CollectionError, ListChange, Subscription, ValueCell};

/// Handle for a listener registered on a [`CellBackedList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

struct Listeners<T> {
    next_id: u64,
    change: Vec<(u64, Rc<dyn Fn(&ListChange<T>)>)>,
    invalidation: Vec<(u64, Rc<dyn Fn()>)>,
}

/// A read-only ordered collection backed by N independent [`ValueCell`]s.
///
/// The list mirrors the current value of each backing cell. When a backing
/// cell changes, the list surfaces exactly one single-element
/// [`ListChange::Updated`] event — never an insert or removal — carrying the
/// element index and the old and new values, to invalidation listeners first
/// and then to structural change listeners.
///
/// Structural mutation is not supported: every mutating operation fails with
/// [`CollectionError::Immutable`]. Read-only derived views (filtered, sorted
/// snapshots) are permitted.
///
/// # Invariants
///
/// 1. `len()` equals the number of backing cells for the list's lifetime.
/// 2. One backing-cell change produces exactly one update event.
/// 3. Listener registration and removal are reflected in the consultable
///    listener counts.
pub struct CellBackedList<T> {
    cells: Vec<ValueCell<T>>,
    snapshot: Rc<RefCell<Vec<T>>>,
    listeners: Rc<RefCell<Listeners<T>>>,
    _cell_subs: Vec<Subscription>,
}

impl<T: Clone + PartialEq + 'static> CellBackedList<T> {
    /// Build a list over the given backing cells.
    #[must_use]
    pub fn new(cells: Vec<ValueCell<T>>) -> Self {
        let snapshot = Rc::new(RefCell::new(
            cells.iter().map(ValueCell::get).collect::<Vec<_>>(),
        ));
        let listeners = Rc::new(RefCell::new(Listeners {
            next_id: 0,
            change: Vec::new(),
            invalidation: Vec::new(),
        }));

        let cell_subs = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let snapshot = Rc::clone(&snapshot);
                let listeners = Rc::clone(&listeners);
                cell.subscribe(move |old, new| {
                    snapshot.borrow_mut()[index] = new.clone();
                    let (invalidation, change) = {
                        let guard = listeners.borrow();
                        (
                            guard
                                .invalidation
                                .iter()
                                .map(|(_, cb)| Rc::clone(cb))
                                .collect::<Vec<_>>(),
                            guard
                                .change
                                .iter()
                                .map(|(_, cb)| Rc::clone(cb))
                                .collect::<Vec<_>>(),
                        )
                    };
                    for callback in invalidation {
                        callback();
                    }
                    let event = ListChange::Updated {
                        index,
                        old: old.clone(),
                        new: new.clone(),
                    };
                    for callback in change {
                        callback(&event);
                    }
                })
            })
            .collect();

        Self {
            cells,
            snapshot,
            listeners,
            _cell_subs: cell_subs,
        }
    }

    // ---- reads -----------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.snapshot.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.snapshot.borrow().contains(item)
    }

    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.snapshot.borrow().iter().position(|i| i == item)
    }

    /// The backing cells, in element order.
    #[must_use]
    pub fn cells(&self) -> &[ValueCell<T>] {
        &self.cells
    }

    /// Read-only filtered view (snapshot).
    #[must_use]
    pub fn filtered(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.snapshot
            .borrow()
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Read-only sorted view (snapshot).
    #[must_use]
    pub fn sorted_by(&self, compare: impl FnMut(&T, &T) -> std::cmp::Ordering) -> Vec<T> {
        let mut items = self.to_vec();
        items.sort_by(compare);
        items
    }

    // ---- structural mutation: always refused -----------------------------

    pub fn add(&self, _item: T) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn add_all(&self, _items: Vec<T>) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn insert(&self, _index: usize, _item: T) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn set(&self, _index: usize, _item: T) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn set_all(&self, _items: Vec<T>) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn remove(&self, _item: &T) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn remove_at(&self, _index: usize) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn clear(&self) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    pub fn sort(&self) -> Result<(), CollectionError> {
        Err(CollectionError::Immutable)
    }

    // ---- listener management ----------------------------------------------

    /// Register a structural change listener.
    pub fn add_change_listener(&self, callback: impl Fn(&ListChange<T>) + 'static) -> ListenerHandle {
        let mut guard = self.listeners.borrow_mut();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.change.push((id, Rc::new(callback)));
        ListenerHandle(id)
    }

    pub fn remove_change_listener(&self, handle: ListenerHandle) {
        self.listeners
            .borrow_mut()
            .change
            .retain(|(id, _)| *id != handle.0);
    }

    /// Register a general invalidation listener.
    pub fn add_invalidation_listener(&self, callback: impl Fn() + 'static) -> ListenerHandle {
        let mut guard = self.listeners.borrow_mut();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.invalidation.push((id, Rc::new(callback)));
        ListenerHandle(id)
    }

    pub fn remove_invalidation_listener(&self, handle: ListenerHandle) {
        self.listeners
            .borrow_mut()
            .invalidation
            .retain(|(id, _)| *id != handle.0);
    }

    #[must_use]
    pub fn change_listener_count(&self) -> usize {
        self.listeners.borrow().change.len()
    }

    #[must_use]
    pub fn invalidation_listener_count(&self) -> usize {
        self.listeners.borrow().invalidation.len()
    }
}

impl<T: std::fmt::Debug + Clone + PartialEq + 'static> std::fmt::Debug for CellBackedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellBackedList")
            .field("items", &self.to_vec())
            .finish()
    }
}
