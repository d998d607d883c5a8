//! Component container: definitions, dependency injection, declarative
//! view wiring, and a phased application context.
//!
//! # Architecture
//!
//! - [`component`]: component trait, definitions, markers, and modules.
//! - [`construct`]: constructor candidate selection for multi-constructor
//!   types.
//! - [`registry`]: the container itself — instance caching, injection, and
//!   the extension pipeline.
//! - [`extension`]: definition- and instance-level extensions that turn
//!   markers into live wiring (selection modes, action handlers, form
//!   bindings).
//! - [`bus`]: priority-ordered publish/subscribe event bus.
//! - [`enhance`]: pluggable decoration around instance initialization.
//! - [`executor`] and [`context`]: thread-affine job execution and the
//!   outer lifecycle (`configure` → `initialize` → retrieval).
//!
//! # Invariants
//!
//! 1. A singleton is constructed at most once per registry; a failed
//!    initialization leaves no cached instance behind.
//! 2. Instance extensions run in a fixed order: multi-selection and filtered
//!    lists are enabled before form bindings resolve their targets.
//! 3. Everything a component's wiring retains (bindings, cell and bus
//!    subscriptions) is released by [`Registry::unbind`] or registry drop.
//! 4. Components are single-thread owned; foreign threads go through
//!    [`AffinityExecutor`].
//!
//! # Failure Modes
//!
//! - Unknown ids and types are `Ok(None)`, never errors.
//! - Broken wiring (missing dependency, marker against a control without the
//!   required capability, phase violations) surfaces as [`ContainerError`].
//! - Event bus handler failures are reported to the error sink (or logged)
//!   and never stop dispatch to later subscribers.

#![forbid(unsafe_code)]

pub mod bus;
pub mod component;
pub mod construct;
pub mod context;
pub mod enhance;
pub mod executor;
pub mod extension;
pub mod registry;

pub use bus::{BusSubscription, EventBus};
pub use component::{
    Component, ComponentDefinition, ComponentRef, DefinitionBuilder, Factory, InjectionPoint,
    Marker, Module,
};
pub use construct::ConstructorCandidate;
pub use context::{AppContext, ContextState};
pub use enhance::{DecoratingEnhancement, EnhancementStrategy, NoEnhancement};
pub use executor::{AffinityExecutor, JobPump};
pub use extension::{DefinitionExtension, ExtensionContext, InstanceExtension, Retained};
pub use registry::Registry;

use thiserror::Error;
use weft_bind::BindError;

/// Errors raised while registering, constructing, or wiring components.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// No registered constructor candidate had all of its parameters
    /// resolvable from the registry.
    #[error("no matching constructor found for type '{type_name}'")]
    NoMatchingConstructor { type_name: &'static str },

    /// A definition was registered through the controller path without the
    /// controller marker.
    #[error("type '{type_name}' is not a controller")]
    NotAController { type_name: &'static str },

    /// Constructing a component re-entered its own construction before any
    /// instance was cached.
    #[error("circular dependency while constructing component '{id}'")]
    CircularDependency { id: String },

    /// An injection point could not be satisfied by id, type, or default
    /// factory.
    #[error("component '{component}': no candidate for field '{field}' of type '{type_name}'")]
    UnresolvedDependency {
        component: String,
        field: &'static str,
        type_name: &'static str,
    },

    /// A marker's declaration is malformed independent of any view.
    #[error("component '{component}': marker '{marker}' is invalid: {reason}")]
    InvalidMarker {
        marker: &'static str,
        component: String,
        reason: &'static str,
    },

    /// A view-directed marker was placed on a component without a view.
    #[error("component '{component}': marker '{marker}' requires a view")]
    NoView {
        component: String,
        marker: &'static str,
    },

    /// A marker names a control the component's view does not contain.
    #[error("component '{component}': marker '{marker}' refers to unknown control '{control_id}'")]
    UnknownControl {
        control_id: String,
        marker: &'static str,
        component: String,
    },

    /// A marker names a control that lacks the capability the marker wires.
    #[error("control '{control_id}': marker '{marker}' requires the {capability} capability")]
    MarkerCapability {
        control_id: String,
        marker: &'static str,
        capability: &'static str,
    },

    /// An operation was attempted in the wrong context phase.
    #[error("operation requires context state '{expected}', but state is '{actual}'")]
    StateError {
        expected: &'static str,
        actual: &'static str,
    },

    /// The job pump was dropped while work was still being submitted.
    #[error("executor is shut down")]
    ExecutorShutDown,

    /// A form binding could not be established.
    #[error(transparent)]
    Bind(#[from] BindError),
}
