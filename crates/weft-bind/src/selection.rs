//! Selection state over an observable list of values.

use std::cell::RefCell;
use std::rc::Rc;

use weft_bean::Value;
use weft_reactive::{ObservableList, Subscription, ValueCell};

/// Tracks which items of a control are selected.
///
/// Selection state is an [`ObservableList`] of selected values plus a
/// [`ValueCell`] mirroring the most recently selected item (`Null` when the
/// selection is empty). The cell follows the list, so bindings may observe
/// either surface; writers that mutate the selected-items list directly see
/// the cell updated as well.
#[derive(Clone)]
pub struct ListSelectionModel {
    inner: Rc<RefCell<ModelInner>>,
    selected: ObservableList<Value>,
    last_selected: ValueCell<Value>,
}

struct ModelInner {
    multi: bool,
    // Keeps the list-to-cell mirror alive for the model's lifetime.
    _mirror: Option<Subscription>,
}

impl ListSelectionModel {
    #[must_use]
    pub fn new(multi: bool) -> Self {
        let selected = ObservableList::new();
        let last_selected = ValueCell::new(Value::Null);
        let inner = Rc::new(RefCell::new(ModelInner {
            multi,
            _mirror: None,
        }));

        let cell = last_selected.clone();
        let list = selected.clone();
        let mirror = selected.subscribe(move |_| {
            let last = list.get(list.len().wrapping_sub(1)).unwrap_or(Value::Null);
            cell.set(last);
        });
        inner.borrow_mut()._mirror = Some(mirror);

        Self {
            inner,
            selected,
            last_selected,
        }
    }

    #[must_use]
    pub fn single() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub fn multi() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.inner.borrow().multi
    }

    /// Switch between single and multiple selection. Shrinking to single
    /// keeps only the most recently selected item.
    pub fn set_multi(&self, multi: bool) {
        self.inner.borrow_mut().multi = multi;
        if !multi && self.selected.len() > 1 {
            let last = self
                .selected
                .get(self.selected.len() - 1)
                .unwrap_or(Value::Null);
            self.selected.set_all(vec![last]);
        }
    }

    /// The live selected-items list.
    #[must_use]
    pub fn selected_items(&self) -> ObservableList<Value> {
        self.selected.clone()
    }

    /// A cell mirroring the most recently selected item.
    #[must_use]
    pub fn selected_item(&self) -> ValueCell<Value> {
        self.last_selected.clone()
    }

    #[must_use]
    pub fn is_selected(&self, value: &Value) -> bool {
        self.selected.contains(value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Select `value`. Single-selection replaces the current selection;
    /// multi-selection appends unless already selected.
    pub fn select(&self, value: Value) {
        if self.is_multi() {
            if !self.selected.contains(&value) {
                self.selected.push(value);
            }
        } else if self.selected.to_vec() != vec![value.clone()] {
            self.selected.set_all(vec![value]);
        }
    }

    /// Select all of `values` (multi-selection; in single mode only the last
    /// one sticks).
    pub fn select_all(&self, values: Vec<Value>) {
        for value in values {
            self.select(value);
        }
    }

    pub fn deselect(&self, value: &Value) {
        self.selected.remove_item(value);
    }

    pub fn clear_selection(&self) {
        self.selected.clear();
    }

    pub fn clear_and_select(&self, value: Value) {
        self.clear_selection();
        self.select(value);
    }
}

impl std::fmt::Debug for ListSelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListSelectionModel")
            .field("multi", &self.is_multi())
            .field("selected", &self.selected.to_vec())
            .finish()
    }
}
