//! Components, their definitions, and declarative markers.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use weft_bean::Value;
use weft_bind::View;

use crate::construct::ConstructorCandidate;

/// A registry-managed instance.
///
/// Controllers additionally expose the view whose controls their markers
/// wire; plain service components return `None`.
pub trait Component: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The view this component controls, when it is a controller.
    fn view(&self) -> Option<View> {
        None
    }

    /// Invoked once after injection and extension wiring.
    fn post_construct(&mut self) {}
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Component")
    }
}

/// Shared handle to a managed instance.
pub type ComponentRef = Rc<RefCell<dyn Component>>;

/// How the registry obtains a fresh instance.
pub enum Factory {
    /// A zero-argument factory.
    NoArg(Box<dyn Fn() -> ComponentRef>),
    /// Candidate constructors; the best fit against the registry's
    /// registered types is chosen at construction time.
    Constructors(Vec<ConstructorCandidate>),
}

/// A dependency declared by a component, satisfied during construction.
///
/// Resolution tries the point's field name as a component id first, then the
/// declared type, then the optional default factory (which registers an
/// implicit singleton definition under the field name).
pub struct InjectionPoint {
    pub field: &'static str,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub inject: fn(&mut dyn Component, ComponentRef),
    pub default_factory: Option<fn() -> ComponentRef>,
}

/// A declarative wiring instruction carried by a component definition.
///
/// Markers are plain data; the instance extension pipeline dispatches them
/// in its fixed order after construction.
#[derive(Clone)]
pub enum Marker {
    /// Switch the control's selection model to multiple selection.
    EnableMultiSelection { control_id: &'static str },
    /// Wrap the control's item collection in a filtered view.
    UseFilteredList { control_id: &'static str },
    /// Invoke a handler whenever the control is activated.
    OnAction {
        control_id: &'static str,
        handler: fn(&mut dyn Component),
    },
    /// Populate the control's item collection from a loader.
    LoadControlData {
        control_id: &'static str,
        loader: fn(&dyn Component) -> Vec<Value>,
    },
    /// Invoke a handler whenever the control's user value changes.
    OnControlValueChange {
        control_id: &'static str,
        handler: fn(&mut dyn Component, &Value),
    },
    /// Bind the controls of the component's view to a form model.
    FormBinding {
        model: fn(&dyn Component) -> Value,
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Subscribe a handler to an event-bus topic.
    Subscribe {
        topic: &'static str,
        priority: i32,
        handler: fn(&mut dyn Component, &Value),
    },
}

impl Marker {
    /// Short name used in wiring errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Marker::EnableMultiSelection { .. } => "enable-multi-selection",
            Marker::UseFilteredList { .. } => "use-filtered-list",
            Marker::OnAction { .. } => "on-action",
            Marker::LoadControlData { .. } => "load-control-data",
            Marker::OnControlValueChange { .. } => "on-control-value-change",
            Marker::FormBinding { .. } => "form-binding",
            Marker::Subscribe { .. } => "subscribe",
        }
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable description of one registered component.
pub struct ComponentDefinition {
    id: String,
    type_name: &'static str,
    type_id: TypeId,
    provides: Vec<TypeId>,
    controller: bool,
    singleton: bool,
    lazy: bool,
    factory: Factory,
    injection_points: Vec<InjectionPoint>,
    markers: Vec<Marker>,
}

impl ComponentDefinition {
    /// Start a definition for `T` under the given id.
    #[must_use]
    pub fn builder<T: Component>(id: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder {
            id: id.into(),
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            provides: vec![TypeId::of::<T>()],
            controller: false,
            singleton: true,
            lazy: true,
            factory: None,
            injection_points: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// A definition the registry fabricates when an injection point falls
    /// back to its default factory: lazy singleton, no markers.
    #[must_use]
    pub fn implicit(
        id: impl Into<String>,
        type_name: &'static str,
        type_id: TypeId,
        factory: fn() -> ComponentRef,
    ) -> Self {
        Self {
            id: id.into(),
            type_name,
            type_id,
            provides: vec![type_id],
            controller: false,
            singleton: true,
            lazy: true,
            factory: Factory::NoArg(Box::new(factory)),
            injection_points: Vec::new(),
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type and every supertype this definition can satisfy, most
    /// specific first.
    #[must_use]
    pub fn provides(&self) -> &[TypeId] {
        &self.provides
    }

    /// Position of `type_id` in the provides chain, used as the
    /// type-difference weight during constructor matching.
    #[must_use]
    pub fn provides_distance(&self, type_id: TypeId) -> Option<usize> {
        self.provides.iter().position(|t| *t == type_id)
    }

    #[must_use]
    pub fn is_controller(&self) -> bool {
        self.controller
    }

    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    #[must_use]
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    #[must_use]
    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("controller", &self.controller)
            .field("singleton", &self.singleton)
            .field("lazy", &self.lazy)
            .field("markers", &self.markers)
            .finish()
    }
}

pub struct DefinitionBuilder {
    id: String,
    type_name: &'static str,
    type_id: TypeId,
    provides: Vec<TypeId>,
    controller: bool,
    singleton: bool,
    lazy: bool,
    factory: Option<Factory>,
    injection_points: Vec<InjectionPoint>,
    markers: Vec<Marker>,
}

impl DefinitionBuilder {
    /// Declare that the component also satisfies requests for `U`.
    #[must_use]
    pub fn provides<U: 'static>(mut self) -> Self {
        self.provides.push(TypeId::of::<U>());
        self
    }

    #[must_use]
    pub fn controller(mut self) -> Self {
        self.controller = true;
        self
    }

    #[must_use]
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    #[must_use]
    pub fn factory(mut self, factory: impl Fn() -> ComponentRef + 'static) -> Self {
        self.factory = Some(Factory::NoArg(Box::new(factory)));
        self
    }

    #[must_use]
    pub fn constructors(mut self, candidates: Vec<ConstructorCandidate>) -> Self {
        self.factory = Some(Factory::Constructors(candidates));
        self
    }

    #[must_use]
    pub fn inject(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }

    #[must_use]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Finish the definition. Definitions without an explicit factory or
    /// constructor list cannot be built.
    #[must_use]
    pub fn build(self) -> ComponentDefinition {
        ComponentDefinition {
            id: self.id,
            type_name: self.type_name,
            type_id: self.type_id,
            provides: self.provides,
            controller: self.controller,
            singleton: self.singleton,
            lazy: self.lazy,
            factory: self
                .factory
                .unwrap_or_else(|| Factory::Constructors(Vec::new())),
            injection_points: self.injection_points,
            markers: self.markers,
        }
    }
}

/// An explicit registrar table: the scannable unit of definitions.
pub struct Module {
    pub name: &'static str,
    pub definitions: Vec<fn() -> ComponentDefinition>,
}
