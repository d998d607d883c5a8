//! Value and collection bindings.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};
use weft_bean::{AccessError, BeanWrapper, PropertyReference, Value};
use weft_reactive::{ListChange, ObservableList, Subscription, ValueCell};

use crate::control::{Control, View};
use crate::convert::{ConversionService, ValueKind};
use crate::target::{BindingTarget, TargetKind};
use crate::BindError;

/// How values travel between the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    /// Both endpoints are reactive and writable; changes travel both ways.
    Bidirectional,
    /// The model cell is observed but not directly writable; control edits
    /// are written back through the property setter instead.
    Unidirectional,
    /// The model side is a plain property; a listener on the control writes
    /// changes back by direct mutation.
    ValueBased,
}

/// A synchronization link between two endpoints.
///
/// `bind` and `unbind` are idempotent; `unbind` removes every listener the
/// binding installed and is fully reversible.
pub trait Binding {
    fn bind(&mut self) -> Result<(), BindError>;
    fn unbind(&mut self);
    fn is_bound(&self) -> bool;
    fn binding_type(&self) -> BindingType;
}

#[derive(Clone)]
enum ModelEndpoint {
    Cell(ValueCell<Value>),
    ReadOnlyCell {
        cell: ValueCell<Value>,
        write_back: PropertyReference,
    },
    Plain(PropertyReference),
}

/// Synchronizes one model property with a control's user value or
/// single-selection surface.
///
/// The direction is chosen from the model endpoint's capabilities at
/// construction time:
///
/// - writable reactive cell → [`BindingType::Bidirectional`]
/// - read-only reactive cell → [`BindingType::Unidirectional`]: the cell is
///   still observed model → control, and control edits are written back into
///   the model through the property setter
/// - plain property → [`BindingType::ValueBased`]
///
/// A re-entrancy guard stops propagated changes from bouncing back. When a
/// write-back into the model fails, the control is restored to its previous
/// value and the failure is logged.
pub struct ValueBinding {
    path: String,
    control: Control,
    kind: TargetKind,
    control_cell: ValueCell<Value>,
    model: ModelEndpoint,
    direction: BindingType,
    format: Option<ValueKind>,
    default_value: Option<Value>,
    conversion: ConversionService,
    guard: Rc<Cell<bool>>,
    subs: Vec<Subscription>,
    bound: bool,
}

impl ValueBinding {
    /// Resolve the model endpoint and validate the control capability.
    pub fn new(
        model_root: &Value,
        control: Control,
        target: &BindingTarget,
        conversion: ConversionService,
    ) -> Result<Self, BindError> {
        // Resolving the observed cell up front doubles as the capability
        // check.
        let control_cell = match target.kind() {
            TargetKind::UserValue => control.value_cell().cloned().ok_or_else(|| {
                BindError::MissingCapability {
                    control_id: control.id().to_owned(),
                    capability: "user value",
                }
            })?,
            TargetKind::SingleSelection => control
                .selection()
                .map(|selection| selection.selected_item())
                .ok_or_else(|| BindError::MissingCapability {
                    control_id: control.id().to_owned(),
                    capability: "selection",
                })?,
            TargetKind::MultiSelection | TargetKind::Items => {
                return Err(BindError::MissingCapability {
                    control_id: control.id().to_owned(),
                    capability: "single value",
                });
            }
        };

        let wrapper = BeanWrapper::new(model_root.clone());
        let resolve_reference = |wrapper: &BeanWrapper| {
            wrapper
                .resolve_reference(target.path())?
                .ok_or_else(|| BindError::UnresolvedPath {
                    path: target.path().to_owned(),
                })
        };
        let model = match wrapper.get_cell(target.path()) {
            Ok(Some(cell)) if cell.is_writable() => ModelEndpoint::Cell(cell),
            // A read-only cell still has the bean's setter path behind it.
            Ok(Some(cell)) => ModelEndpoint::ReadOnlyCell {
                cell,
                write_back: resolve_reference(&wrapper)?,
            },
            Ok(None) => {
                return Err(BindError::UnresolvedPath {
                    path: target.path().to_owned(),
                });
            }
            Err(AccessError::NoPropertyGetter { .. }) => {
                ModelEndpoint::Plain(resolve_reference(&wrapper)?)
            }
            Err(e) => return Err(e.into()),
        };

        let direction = match &model {
            ModelEndpoint::Cell(_) => BindingType::Bidirectional,
            ModelEndpoint::ReadOnlyCell { .. } => BindingType::Unidirectional,
            ModelEndpoint::Plain(_) => BindingType::ValueBased,
        };

        Ok(Self {
            path: target.path().to_owned(),
            control,
            kind: target.kind(),
            control_cell,
            model,
            direction,
            format: target.format(),
            default_value: target.default_value().cloned(),
            conversion,
            guard: Rc::new(Cell::new(false)),
            subs: Vec::new(),
            bound: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn control_id(&self) -> &str {
        self.control.id()
    }

    fn model_value(&self) -> Result<Value, BindError> {
        match &self.model {
            ModelEndpoint::Cell(cell) | ModelEndpoint::ReadOnlyCell { cell, .. } => Ok(cell.get()),
            ModelEndpoint::Plain(reference) => Ok(reference.get_value()?),
        }
    }

    fn to_control_shape(&self, value: &Value) -> Result<Value, BindError> {
        match self.format {
            Some(kind) => self.conversion.convert(value, kind),
            None => Ok(value.clone()),
        }
    }
}

/// Apply a value to the control's bound surface.
fn push_to_control(control: &Control, kind: TargetKind, value: Value) {
    match kind {
        TargetKind::SingleSelection => {
            if let Some(selection) = control.selection() {
                if value.is_null() {
                    selection.clear_selection();
                } else {
                    selection.select(value);
                }
            }
        }
        _ => {
            if let Some(cell) = control.value_cell() {
                cell.set(value);
            }
        }
    }
}

impl Binding for ValueBinding {
    fn bind(&mut self) -> Result<(), BindError> {
        if self.bound {
            return Ok(());
        }

        // Initial sync, control <- model; a Null model value takes the
        // declared default and seeds the model with it.
        let mut initial = self.model_value()?;
        if initial.is_null() {
            if let Some(default) = &self.default_value {
                initial = default.clone();
                match &self.model {
                    ModelEndpoint::Cell(cell) => cell.set(initial.clone()),
                    ModelEndpoint::ReadOnlyCell { write_back, .. } => {
                        if write_back.is_writable() {
                            write_back.set_value(initial.clone())?;
                        }
                    }
                    ModelEndpoint::Plain(reference) => reference.set_value(initial.clone())?,
                }
            }
        }
        let model_kind = ValueKind::of(&initial);
        push_to_control(&self.control, self.kind, self.to_control_shape(&initial)?);

        // Model -> control.
        if let ModelEndpoint::Cell(cell) | ModelEndpoint::ReadOnlyCell { cell, .. } = &self.model {
            let guard = Rc::clone(&self.guard);
            let control = self.control.clone();
            let kind = self.kind;
            let format = self.format;
            let conversion = self.conversion;
            let model_cell = cell.clone();
            let path = self.path.clone();
            self.subs.push(cell.subscribe(move |old, new| {
                if guard.get() {
                    return;
                }
                guard.set(true);
                let shaped = match format {
                    Some(f) => conversion.convert(new, f),
                    None => Ok(new.clone()),
                };
                match shaped {
                    Ok(value) => push_to_control(&control, kind, value),
                    Err(e) => {
                        warn!(path = %path, error = %e, "propagation failed; restoring model value");
                        model_cell.set(old.clone());
                    }
                }
                guard.set(false);
            }));
        }

        // Control -> model. Write-back goes through the cell when it is
        // writable and through the property setter otherwise.
        {
            let guard = Rc::clone(&self.guard);
            let conversion = self.conversion;
            let format = self.format;
            let path = self.path.clone();
            let restore = self.control_cell.clone();
            let model = self.model.clone();
            self.subs.push(self.control_cell.subscribe(move |old, new| {
                if guard.get() {
                    return;
                }
                guard.set(true);
                let shaped = match (format, model_kind) {
                    (Some(_), Some(kind)) => conversion.convert(new, kind),
                    _ => Ok(new.clone()),
                };
                let written = shaped.and_then(|value| match &model {
                    ModelEndpoint::Cell(cell) => {
                        cell.set(value);
                        Ok(())
                    }
                    ModelEndpoint::ReadOnlyCell { write_back, .. } => {
                        write_back.set_value(value).map_err(BindError::from)
                    }
                    ModelEndpoint::Plain(reference) => {
                        reference.set_value(value).map_err(BindError::from)
                    }
                });
                if let Err(e) = written {
                    warn!(path = %path, error = %e, "write-back failed; restoring control value");
                    restore.set(old.clone());
                }
                guard.set(false);
            }));
        }

        self.bound = true;
        debug!(
            control = %self.control.id(),
            path = %self.path,
            direction = ?self.direction,
            "value binding installed"
        );
        Ok(())
    }

    fn unbind(&mut self) {
        if !self.bound {
            return;
        }
        self.subs.clear();
        self.bound = false;
        debug!(control = %self.control.id(), path = %self.path, "value binding removed");
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn binding_type(&self) -> BindingType {
        self.direction
    }
}

impl Drop for ValueBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}

/// Element-for-element synchronization of two observable lists.
///
/// Structural changes on either side replicate to the other; the re-entrancy
/// guard keeps the replicated change from bouncing back.
pub struct ListBinding {
    source: ObservableList<Value>,
    target: ObservableList<Value>,
    guard: Rc<Cell<bool>>,
    subs: Vec<Subscription>,
    bound: bool,
}

impl ListBinding {
    #[must_use]
    pub fn new(source: ObservableList<Value>, target: ObservableList<Value>) -> Self {
        Self {
            source,
            target,
            guard: Rc::new(Cell::new(false)),
            subs: Vec::new(),
            bound: false,
        }
    }
}

fn replicate(other: &ObservableList<Value>, change: &ListChange<Value>) {
    match change {
        ListChange::Inserted { from, items } => other.insert_all(*from, items.clone()),
        ListChange::Removed { from, items } => other.remove_range(*from, from + items.len()),
        ListChange::Updated { index, new, .. } => other.set(*index, new.clone()),
    }
}

impl Binding for ListBinding {
    fn bind(&mut self) -> Result<(), BindError> {
        if self.bound {
            return Ok(());
        }

        self.guard.set(true);
        self.target.set_all(self.source.to_vec());
        self.guard.set(false);

        for (from, to) in [
            (self.source.clone(), self.target.clone()),
            (self.target.clone(), self.source.clone()),
        ] {
            let guard = Rc::clone(&self.guard);
            self.subs.push(from.subscribe(move |change| {
                if guard.get() {
                    return;
                }
                guard.set(true);
                replicate(&to, change);
                guard.set(false);
            }));
        }

        self.bound = true;
        debug!("list binding installed");
        Ok(())
    }

    fn unbind(&mut self) {
        if !self.bound {
            return;
        }
        self.subs.clear();
        self.bound = false;
        debug!("list binding removed");
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn binding_type(&self) -> BindingType {
        BindingType::Bidirectional
    }
}

impl Drop for ListBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}

/// Build and install the binding a target describes.
pub fn bind_target(
    model: &Value,
    view: &View,
    target: &BindingTarget,
    conversion: ConversionService,
) -> Result<Box<dyn Binding>, BindError> {
    let control =
        view.control(target.control_id())
            .ok_or_else(|| BindError::UnknownControl {
                control_id: target.control_id().to_owned(),
                view_id: view.id().to_owned(),
            })?;

    match target.kind() {
        TargetKind::UserValue | TargetKind::SingleSelection => {
            let mut binding = ValueBinding::new(model, control, target, conversion)?;
            binding.bind()?;
            Ok(Box::new(binding))
        }
        TargetKind::MultiSelection => {
            let selection = control
                .selection()
                .filter(|s| s.is_multi())
                .ok_or_else(|| BindError::MissingCapability {
                    control_id: control.id().to_owned(),
                    capability: "multi-selection",
                })?
                .clone();
            let mut binding = ListBinding::new(model_list(model, target.path())?, selection.selected_items());
            binding.bind()?;
            Ok(Box::new(binding))
        }
        TargetKind::Items => {
            let items = control
                .items()
                .ok_or_else(|| BindError::MissingCapability {
                    control_id: control.id().to_owned(),
                    capability: "items",
                })?
                .clone();
            let mut binding = ListBinding::new(model_list(model, target.path())?, items);
            binding.bind()?;
            Ok(Box::new(binding))
        }
    }
}

fn model_list(model: &Value, path: &str) -> Result<ObservableList<Value>, BindError> {
    match BeanWrapper::new(model.clone()).get_property_value(path)? {
        Value::ObsList(list) => Ok(list),
        other => Err(BindError::ModelNotList {
            path: path.to_owned(),
            type_name: other.type_name(),
        }),
    }
}
