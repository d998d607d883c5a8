//! The capability surface of controls and views.
//!
//! Views are opaque containers of named controls. A control is not a widget:
//! it is the set of bindable capabilities a widget exposes, namely a user
//! value cell, an item collection, and a selection model.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use weft_bean::Value;
use weft_reactive::{ObservableList, ValueCell};

use crate::selection::ListSelectionModel;

type Filter = Rc<dyn Fn(&Value) -> bool>;

struct ControlInner {
    id: String,
    value: Option<ValueCell<Value>>,
    items: Option<ObservableList<Value>>,
    selection: Option<ListSelectionModel>,
    action: Option<ValueCell<Value>>,
    filter: RefCell<Option<Filter>>,
}

/// A bindable control: a cheaply cloneable handle over its capabilities.
#[derive(Clone)]
pub struct Control {
    inner: Rc<ControlInner>,
}

impl Control {
    #[must_use]
    pub fn builder(id: impl Into<String>) -> ControlBuilder {
        ControlBuilder {
            id: id.into(),
            value: None,
            items: None,
            selection: None,
            action: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The user value cell, when the control carries one.
    #[must_use]
    pub fn value_cell(&self) -> Option<&ValueCell<Value>> {
        self.inner.value.as_ref()
    }

    /// The item collection, when the control carries one.
    #[must_use]
    pub fn items(&self) -> Option<&ObservableList<Value>> {
        self.inner.items.as_ref()
    }

    /// The selection model, when the control carries one.
    #[must_use]
    pub fn selection(&self) -> Option<&ListSelectionModel> {
        self.inner.selection.as_ref()
    }

    /// The action cell, when the control is activatable. Each activation
    /// writes a fresh sequence number into the cell.
    #[must_use]
    pub fn action_cell(&self) -> Option<&ValueCell<Value>> {
        self.inner.action.as_ref()
    }

    /// Signal one activation of the control.
    pub fn fire_action(&self) {
        if let Some(action) = &self.inner.action {
            let next = action.get().as_int().unwrap_or(0) + 1;
            action.set(Value::Int(next));
        }
    }

    #[must_use]
    pub fn supports_value(&self) -> bool {
        self.inner.value.is_some()
    }

    #[must_use]
    pub fn supports_items(&self) -> bool {
        self.inner.items.is_some()
    }

    #[must_use]
    pub fn supports_selection(&self) -> bool {
        self.inner.selection.is_some()
    }

    #[must_use]
    pub fn supports_action(&self) -> bool {
        self.inner.action.is_some()
    }

    #[must_use]
    pub fn supports_multi_selection(&self) -> bool {
        self.inner
            .selection
            .as_ref()
            .is_some_and(ListSelectionModel::is_multi)
    }

    /// Install a display filter over the item collection.
    pub fn set_filter(&self, predicate: impl Fn(&Value) -> bool + 'static) {
        *self.inner.filter.borrow_mut() = Some(Rc::new(predicate));
    }

    pub fn clear_filter(&self) {
        *self.inner.filter.borrow_mut() = None;
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.inner.filter.borrow().is_some()
    }

    /// The items currently visible, honoring the installed filter.
    #[must_use]
    pub fn visible_items(&self) -> Vec<Value> {
        let all = self
            .inner
            .items
            .as_ref()
            .map(ObservableList::to_vec)
            .unwrap_or_default();
        match &*self.inner.filter.borrow() {
            Some(filter) => all.into_iter().filter(|v| filter(v)).collect(),
            None => all,
        }
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.inner.id)
            .field("value", &self.supports_value())
            .field("items", &self.supports_items())
            .field("selection", &self.supports_selection())
            .finish()
    }
}

pub struct ControlBuilder {
    id: String,
    value: Option<ValueCell<Value>>,
    items: Option<ObservableList<Value>>,
    selection: Option<ListSelectionModel>,
    action: Option<ValueCell<Value>>,
}

impl ControlBuilder {
    #[must_use]
    pub fn value(mut self, cell: ValueCell<Value>) -> Self {
        self.value = Some(cell);
        self
    }

    #[must_use]
    pub fn items(mut self, items: ObservableList<Value>) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn selection(mut self, selection: ListSelectionModel) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Make the control activatable.
    #[must_use]
    pub fn action(mut self) -> Self {
        self.action = Some(ValueCell::new(Value::Int(0)));
        self
    }

    #[must_use]
    pub fn build(self) -> Control {
        Control {
            inner: Rc::new(ControlInner {
                id: self.id,
                value: self.value,
                items: self.items,
                selection: self.selection,
                action: self.action,
                filter: RefCell::new(None),
            }),
        }
    }
}

struct ViewInner {
    id: String,
    controls: AHashMap<String, Control>,
    order: Vec<String>,
}

/// An opaque view: named controls behind a stable view id.
#[derive(Clone)]
pub struct View {
    inner: Rc<ViewInner>,
}

impl View {
    #[must_use]
    pub fn new(id: impl Into<String>, controls: Vec<Control>) -> Self {
        let order = controls.iter().map(|c| c.id().to_owned()).collect();
        let controls = controls
            .into_iter()
            .map(|c| (c.id().to_owned(), c))
            .collect();
        Self {
            inner: Rc::new(ViewInner {
                id: id.into(),
                controls,
                order,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn control(&self, id: &str) -> Option<Control> {
        self.inner.controls.get(id).cloned()
    }

    /// Control ids in registration order.
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.inner.order.iter().map(String::as_str)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("id", &self.inner.id)
            .field("controls", &self.inner.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_follow_the_builder() {
        let plain = Control::builder("label").build();
        assert!(!plain.supports_value());
        assert!(!plain.supports_items());
        assert!(!plain.supports_selection());

        let full = Control::builder("table")
            .value(ValueCell::new(Value::Null))
            .items(ObservableList::new())
            .selection(ListSelectionModel::multi())
            .build();
        assert!(full.supports_value());
        assert!(full.supports_items());
        assert!(full.supports_multi_selection());
    }

    #[test]
    fn view_lookup_by_id() {
        let view = View::new(
            "mainView",
            vec![
                Control::builder("name").build(),
                Control::builder("age").build(),
            ],
        );
        assert!(view.control("name").is_some());
        assert!(view.control("missing").is_none());
        assert_eq!(view.control_ids().collect::<Vec<_>>(), ["name", "age"]);
    }

    #[test]
    fn firing_an_action_bumps_the_sequence() {
        let button = Control::builder("save").action().build();
        assert!(button.supports_action());
        button.fire_action();
        button.fire_action();
        assert_eq!(button.action_cell().unwrap().get(), Value::Int(2));
    }

    #[test]
    fn filter_narrows_visible_items() {
        let items = ObservableList::from_vec(vec![
            Value::from(1),
            Value::from(2),
            Value::from(3),
        ]);
        let control = Control::builder("list").items(items).build();
        assert_eq!(control.visible_items().len(), 3);

        control.set_filter(|v| v.as_int().is_some_and(|i| i > 1));
        assert!(control.is_filtered());
        assert_eq!(control.visible_items(), vec![Value::from(2), Value::from(3)]);

        control.clear_filter();
        assert_eq!(control.visible_items().len(), 3);
    }
}
