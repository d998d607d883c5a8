//! The component registry: definitions, instances, injection, extensions.

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, warn};
use weft_bind::ConversionService;

use crate::bus::EventBus;
use crate::component::{ComponentDefinition, ComponentRef, Factory, Marker, Module};
use crate::construct::require_candidate;
use crate::enhance::{EnhancementStrategy, NoEnhancement};
use crate::extension::{
    builtin_definition_extensions, builtin_instance_extensions, DefinitionExtension,
    ExtensionContext, InstanceExtension, Retained,
};
use crate::ContainerError;

/// Keyed store of component definitions and their managed instances.
///
/// Singletons are cached for the registry's lifetime; prototypes are
/// constructed fresh on every request, each with full initialization
/// (injection, instance extensions, post-construct hook). Unknown ids and
/// types are absences, never errors.
///
/// # Invariants
///
/// 1. A definition is immutable once registered.
/// 2. The instance extension order is: built-ins in their documented order,
///    then custom extensions in registration order.
/// 3. Listener handles and bindings installed during initialization stay
///    alive until [`unbind`](Self::unbind) or registry drop.
pub struct Registry {
    definitions: RefCell<AHashMap<String, Rc<ComponentDefinition>>>,
    order: RefCell<Vec<String>>,
    singletons: RefCell<AHashMap<String, ComponentRef>>,
    constructing: RefCell<Vec<String>>,
    definition_extensions: RefCell<Vec<Box<dyn DefinitionExtension>>>,
    instance_extensions: RefCell<Vec<Box<dyn InstanceExtension>>>,
    retained: RefCell<AHashMap<String, Retained>>,
    event_bus: EventBus,
    conversion: ConversionService,
    enhancement: RefCell<Box<dyn EnhancementStrategy>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: RefCell::new(AHashMap::new()),
            order: RefCell::new(Vec::new()),
            singletons: RefCell::new(AHashMap::new()),
            constructing: RefCell::new(Vec::new()),
            definition_extensions: RefCell::new(builtin_definition_extensions()),
            instance_extensions: RefCell::new(builtin_instance_extensions()),
            retained: RefCell::new(AHashMap::new()),
            event_bus: EventBus::new(),
            conversion: ConversionService,
            enhancement: RefCell::new(Box::new(NoEnhancement)),
        }
    }

    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn set_enhancement_strategy(&self, strategy: Box<dyn EnhancementStrategy>) {
        *self.enhancement.borrow_mut() = strategy;
    }

    /// Append a custom definition extension after the built-ins.
    pub fn add_definition_extension(&self, extension: Box<dyn DefinitionExtension>) {
        self.definition_extensions.borrow_mut().push(extension);
    }

    /// Append a custom instance extension after the built-ins.
    pub fn add_instance_extension(&self, extension: Box<dyn InstanceExtension>) {
        self.instance_extensions.borrow_mut().push(extension);
    }

    // ---- definitions -----------------------------------------------------

    /// Register a definition and run the definition extension pipeline on
    /// it. Re-registering an id replaces the previous definition.
    pub fn add_definition(&self, definition: ComponentDefinition) -> Result<(), ContainerError> {
        self.post_process_definition(&definition)?;
        let id = definition.id().to_owned();
        debug!(id = %id, r#type = definition.type_name(), "definition registered");
        let previous = self
            .definitions
            .borrow_mut()
            .insert(id.clone(), Rc::new(definition));
        if previous.is_some() {
            warn!(id = %id, "definition replaced");
        } else {
            self.order.borrow_mut().push(id);
        }
        Ok(())
    }

    /// Like [`add_definition`](Self::add_definition), but refuses types that
    /// do not carry the controller marker.
    pub fn add_controller_definition(
        &self,
        definition: ComponentDefinition,
    ) -> Result<(), ContainerError> {
        if !definition.is_controller() {
            return Err(ContainerError::NotAController {
                type_name: definition.type_name(),
            });
        }
        self.add_definition(definition)
    }

    /// Run every definition extension over `definition`.
    pub fn post_process_definition(
        &self,
        definition: &ComponentDefinition,
    ) -> Result<(), ContainerError> {
        for extension in self.definition_extensions.borrow().iter() {
            extension.apply(definition)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.borrow().contains_key(id)
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn definition_ids(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    /// Register a module's definitions, then eagerly construct its non-lazy
    /// singletons.
    pub fn scan(&self, module: &Module) -> Result<(), ContainerError> {
        debug!(module = module.name, "scanning module");
        let mut registered = Vec::new();
        for registrar in &module.definitions {
            let definition = registrar();
            registered.push(definition.id().to_owned());
            self.add_definition(definition)?;
        }
        for id in registered {
            let eager = self
                .definitions
                .borrow()
                .get(&id)
                .is_some_and(|d| d.is_singleton() && !d.is_lazy());
            if eager {
                let _ = self.get_by_id(&id)?;
            }
        }
        Ok(())
    }

    // ---- retrieval ---------------------------------------------------------

    /// The instance registered under `id`, constructing it on first access.
    pub fn get_by_id(&self, id: &str) -> Result<Option<ComponentRef>, ContainerError> {
        let definition = self.definitions.borrow().get(id).cloned();
        let Some(definition) = definition else {
            return Ok(None);
        };
        if definition.is_singleton() {
            if let Some(cached) = self.singletons.borrow().get(id) {
                return Ok(Some(Rc::clone(cached)));
            }
        }

        if self.constructing.borrow().iter().any(|c| c == id) {
            return Err(ContainerError::CircularDependency {
                id: id.to_owned(),
            });
        }
        self.constructing.borrow_mut().push(id.to_owned());
        let result = self.construct_and_initialize(id, &definition);
        self.constructing.borrow_mut().pop();
        result.map(Some)
    }

    fn construct_and_initialize(
        &self,
        id: &str,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<ComponentRef, ContainerError> {
        let instance = self.instantiate(definition)?;
        if definition.is_singleton() {
            self.singletons
                .borrow_mut()
                .insert(id.to_owned(), Rc::clone(&instance));
        }
        if let Err(e) = self.initialize(definition, &instance) {
            // Never cache a partially initialized singleton.
            self.singletons.borrow_mut().remove(id);
            return Err(e);
        }
        Ok(instance)
    }

    /// The instance satisfying `T`: an exactly registered type is preferred
    /// over a provides-chain match; ties go to registration order.
    pub fn get_by_type<T: 'static>(&self) -> Result<Option<ComponentRef>, ContainerError> {
        self.get_by_type_id(TypeId::of::<T>())
    }

    pub fn get_by_type_id(
        &self,
        type_id: TypeId,
    ) -> Result<Option<ComponentRef>, ContainerError> {
        let id = {
            let definitions = self.definitions.borrow();
            let order = self.order.borrow();
            let exact = order
                .iter()
                .find(|id| definitions.get(*id).is_some_and(|d| d.type_id() == type_id));
            exact
                .or_else(|| {
                    order.iter().find(|id| {
                        definitions
                            .get(*id)
                            .is_some_and(|d| d.provides().contains(&type_id))
                    })
                })
                .cloned()
        };
        match id {
            Some(id) => self.get_by_id(&id),
            None => Ok(None),
        }
    }

    /// Smallest type-difference distance at which any registered definition
    /// reaches `type_id`.
    #[must_use]
    pub fn type_distance(&self, type_id: TypeId) -> Option<usize> {
        self.definitions
            .borrow()
            .values()
            .filter_map(|d| d.provides_distance(type_id))
            .min()
    }

    /// Drop every binding installed for `id`, leaving the instance itself
    /// alive.
    pub fn unbind(&self, id: &str) {
        if let Some(retained) = self.retained.borrow_mut().get_mut(id) {
            retained.unbind_all();
            debug!(id, "bindings released");
        }
    }

    // ---- construction ---------------------------------------------------------

    fn instantiate(&self, definition: &ComponentDefinition) -> Result<ComponentRef, ContainerError> {
        match definition.factory() {
            Factory::NoArg(factory) => Ok(factory()),
            Factory::Constructors(candidates) => {
                let candidate = require_candidate(definition.type_name(), candidates, |t| {
                    self.type_distance(t)
                })?;
                let mut args = Vec::with_capacity(candidate.param_types.len());
                for param in &candidate.param_types {
                    let arg = self.get_by_type_id(*param)?.ok_or_else(|| {
                        ContainerError::NoMatchingConstructor {
                            type_name: definition.type_name(),
                        }
                    })?;
                    args.push(arg);
                }
                Ok((candidate.build)(args))
            }
        }
    }

    fn initialize(
        &self,
        definition: &Rc<ComponentDefinition>,
        instance: &ComponentRef,
    ) -> Result<(), ContainerError> {
        let enhancement = self.enhancement.borrow();
        enhancement.around_init(definition.id(), &mut || {
            self.inject_members(definition, instance)?;

            let mut retained = Retained::default();
            {
                let ctx = ExtensionContext {
                    event_bus: &self.event_bus,
                    conversion: self.conversion,
                };
                for extension in self.instance_extensions.borrow().iter() {
                    debug!(
                        id = definition.id(),
                        extension = extension.name(),
                        "applying instance extension"
                    );
                    retained.merge(extension.apply(definition, instance, &ctx)?);
                }
            }
            retained.merge(self.wire_subscriptions(definition, instance));
            if !retained.is_empty() {
                self.retained
                    .borrow_mut()
                    .entry(definition.id().to_owned())
                    .or_default()
                    .merge(retained);
            }

            instance.borrow_mut().post_construct();
            Ok(())
        })
    }

    fn inject_members(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
    ) -> Result<(), ContainerError> {
        for point in definition.injection_points() {
            // Resolution order: by id, by type, then the point's default
            // factory through an implicit definition.
            let mut dependency = self.get_by_id(point.field)?;
            if dependency.is_none() {
                dependency = self.get_by_type_id(point.type_id)?;
            }
            if dependency.is_none() {
                if let Some(factory) = point.default_factory {
                    self.add_definition(ComponentDefinition::implicit(
                        point.field,
                        point.type_name,
                        point.type_id,
                        factory,
                    ))?;
                    dependency = self.get_by_id(point.field)?;
                }
            }
            let dependency = dependency.ok_or_else(|| ContainerError::UnresolvedDependency {
                component: definition.id().to_owned(),
                field: point.field,
                type_name: point.type_name,
            })?;
            debug!(id = definition.id(), field = point.field, "dependency injected");
            (point.inject)(&mut *instance.borrow_mut(), dependency);
        }
        Ok(())
    }

    fn wire_subscriptions(
        &self,
        definition: &ComponentDefinition,
        instance: &ComponentRef,
    ) -> Retained {
        let mut retained = Retained::default();
        for marker in definition.markers() {
            if let Marker::Subscribe {
                topic,
                priority,
                handler,
            } = marker
            {
                let target = Rc::clone(instance);
                let handler = *handler;
                retained.bus_subscriptions.push(self.event_bus.subscribe(
                    *topic,
                    *priority,
                    move |event| {
                        handler(&mut *target.borrow_mut(), event);
                        Ok(())
                    },
                ));
            }
        }
        retained
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
