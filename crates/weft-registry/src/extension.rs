//! The extension pipeline: definition-level and instance-level wiring.
//!
//! Definition extensions run once when a definition is registered. Instance
//! extensions run once per constructed instance, in a fixed order: control
//! configuration first (enable-multi-selection, use-filtered-list), then
//! data and method wiring (on-action, load-control-data,
//! on-control-value-change), then form binding. Custom extensions append
//! after the built-ins.

use std::rc::Rc;

use tracing::debug;
use weft_bind::{bind_target, Binding, Control, ConversionService, NameBasedResolver,
    BindingTargetResolver, View};
use weft_reactive::Subscription;

use crate::bus::{BusSubscription, EventBus};
use crate::component::{ComponentDefinition, ComponentRef, Marker};
use crate::ContainerError;

/// Listener handles and bindings an extension installed; kept alive for the
/// instance's lifetime by the registry.
#[derive(Default)]
pub struct Retained {
    pub bindings: Vec<Box<dyn Binding>>,
    pub subscriptions: Vec<Subscription>,
    pub bus_subscriptions: Vec<BusSubscription>,
}

impl Retained {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
            && self.subscriptions.is_empty()
            && self.bus_subscriptions.is_empty()
    }

    pub fn merge(&mut self, other: Retained) {
        self.bindings.extend(other.bindings);
        self.subscriptions.extend(other.subscriptions);
        self.bus_subscriptions.extend(other.bus_subscriptions);
    }

    /// Tear down every binding while keeping plain listeners.
    pub fn unbind_all(&mut self) {
        for binding in &mut self.bindings {
            binding.unbind();
        }
        self.bindings.clear();
    }
}

/// Shared services available to instance extensions.
pub struct ExtensionContext<'a> {
    pub event_bus: &'a EventBus,
    pub conversion: ConversionService,
}

/// Runs once per registered definition.
pub trait DefinitionExtension {
    fn name(&self) -> &'static str;

    fn apply(&self, definition: &ComponentDefinition) -> Result<(), ContainerError>;
}

/// Runs once per constructed instance, before its post-construct hook.
pub trait InstanceExtension {
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError>;
}

/// The built-in instance extensions in their documented order.
#[must_use]
pub fn builtin_instance_extensions() -> Vec<Box<dyn InstanceExtension>> {
    vec![
        Box::new(EnableMultiSelectionExtension),
        Box::new(UseFilteredListExtension),
        Box::new(OnActionExtension),
        Box::new(LoadControlDataExtension),
        Box::new(OnControlValueChangeExtension),
        Box::new(FormBindingExtension),
    ]
}

/// The built-in definition extensions.
#[must_use]
pub fn builtin_definition_extensions() -> Vec<Box<dyn DefinitionExtension>> {
    vec![Box::new(SubscriptionValidator)]
}

/// Validates subscribe markers at registration time.
pub struct SubscriptionValidator;

impl DefinitionExtension for SubscriptionValidator {
    fn name(&self) -> &'static str {
        "subscription-validator"
    }

    fn apply(&self, definition: &ComponentDefinition) -> Result<(), ContainerError> {
        for marker in definition.markers() {
            if let Marker::Subscribe { topic, priority, .. } = marker {
                if topic.is_empty() {
                    return Err(ContainerError::InvalidMarker {
                        marker: marker.name(),
                        component: definition.id().to_owned(),
                        reason: "subscription topic must not be empty",
                    });
                }
                debug!(
                    component = definition.id(),
                    topic, priority, "event subscription declared"
                );
            }
        }
        Ok(())
    }
}

/// Look up the control a marker names on the component's view.
fn marker_control(
    definition: &ComponentDefinition,
    instance: &ComponentRef,
    marker: &'static str,
    control_id: &'static str,
) -> Result<(View, Control), ContainerError> {
    let view = instance
        .borrow()
        .view()
        .ok_or_else(|| ContainerError::NoView {
            component: definition.id().to_owned(),
            marker,
        })?;
    let control = view
        .control(control_id)
        .ok_or_else(|| ContainerError::UnknownControl {
            control_id: control_id.to_owned(),
            marker,
            component: definition.id().to_owned(),
        })?;
    Ok((view, control))
}

fn capability_error(
    control: &Control,
    marker: &'static str,
    capability: &'static str,
) -> ContainerError {
    ContainerError::MarkerCapability {
        control_id: control.id().to_owned(),
        marker,
        capability,
    }
}

pub struct EnableMultiSelectionExtension;

impl InstanceExtension for EnableMultiSelectionExtension {
    fn name(&self) -> &'static str {
        "enable-multi-selection"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        _ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        for marker in definition.markers() {
            if let Marker::EnableMultiSelection { control_id } = marker {
                let (_, control) =
                    marker_control(definition, instance, self.name(), control_id)?;
                let selection = control
                    .selection()
                    .ok_or_else(|| capability_error(&control, self.name(), "selection"))?;
                selection.set_multi(true);
                debug!(control = control.id(), "multi-selection enabled");
            }
        }
        Ok(Retained::default())
    }
}

pub struct UseFilteredListExtension;

impl InstanceExtension for UseFilteredListExtension {
    fn name(&self) -> &'static str {
        "use-filtered-list"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        _ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        for marker in definition.markers() {
            if let Marker::UseFilteredList { control_id } = marker {
                let (_, control) =
                    marker_control(definition, instance, self.name(), control_id)?;
                if !control.supports_items() {
                    return Err(capability_error(&control, self.name(), "items"));
                }
                control.set_filter(|_| true);
                debug!(control = control.id(), "filtered item view installed");
            }
        }
        Ok(Retained::default())
    }
}

pub struct OnActionExtension;

impl InstanceExtension for OnActionExtension {
    fn name(&self) -> &'static str {
        "on-action"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        _ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        let mut retained = Retained::default();
        for marker in definition.markers() {
            if let Marker::OnAction {
                control_id,
                handler,
            } = marker
            {
                let (_, control) =
                    marker_control(definition, instance, self.name(), control_id)?;
                let action = control
                    .action_cell()
                    .ok_or_else(|| capability_error(&control, self.name(), "action"))?;
                let target = Rc::clone(instance);
                let handler = *handler;
                retained.subscriptions.push(action.subscribe(move |_, _| {
                    handler(&mut *target.borrow_mut());
                }));
                debug!(control = control.id(), "action handler wired");
            }
        }
        Ok(retained)
    }
}

pub struct LoadControlDataExtension;

impl InstanceExtension for LoadControlDataExtension {
    fn name(&self) -> &'static str {
        "load-control-data"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        _ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        for marker in definition.markers() {
            if let Marker::LoadControlData { control_id, loader } = marker {
                let (_, control) =
                    marker_control(definition, instance, self.name(), control_id)?;
                let items = control
                    .items()
                    .ok_or_else(|| capability_error(&control, self.name(), "items"))?;
                let data = loader(&*instance.borrow());
                debug!(control = control.id(), count = data.len(), "control data loaded");
                items.set_all(data);
            }
        }
        Ok(Retained::default())
    }
}

pub struct OnControlValueChangeExtension;

impl InstanceExtension for OnControlValueChangeExtension {
    fn name(&self) -> &'static str {
        "on-control-value-change"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        _ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        let mut retained = Retained::default();
        for marker in definition.markers() {
            if let Marker::OnControlValueChange {
                control_id,
                handler,
            } = marker
            {
                let (_, control) =
                    marker_control(definition, instance, self.name(), control_id)?;
                let cell = control
                    .value_cell()
                    .ok_or_else(|| capability_error(&control, self.name(), "user value"))?;
                let target = Rc::clone(instance);
                let handler = *handler;
                retained.subscriptions.push(cell.subscribe(move |_, new| {
                    handler(&mut *target.borrow_mut(), new);
                }));
                debug!(control = control.id(), "value-change handler wired");
            }
        }
        Ok(retained)
    }
}

pub struct FormBindingExtension;

impl InstanceExtension for FormBindingExtension {
    fn name(&self) -> &'static str {
        "form-binding"
    }

    fn apply(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
        ctx: &ExtensionContext<'_>,
    ) -> Result<Retained, ContainerError> {
        let mut retained = Retained::default();
        for marker in definition.markers() {
            if let Marker::FormBinding {
                model,
                prefix,
                suffix,
            } = marker
            {
                let view = instance
                    .borrow()
                    .view()
                    .ok_or_else(|| ContainerError::NoView {
                        component: definition.id().to_owned(),
                        marker: self.name(),
                    })?;
                let model = model(&*instance.borrow());
                let resolver = NameBasedResolver::new(*prefix, *suffix);
                for target in resolver.resolve(&model, &view) {
                    debug!(
                        control = target.control_id(),
                        path = target.path(),
                        "form binding target resolved"
                    );
                    retained
                        .bindings
                        .push(bind_target(&model, &view, &target, ctx.conversion)?);
                }
            }
        }
        Ok(retained)
    }
}
