//! Reactive bindings between object graphs and control surfaces.
//!
//! A binding keeps a model property and a control capability synchronized.
//! Controls are capability surfaces (user value, item collection, selection),
//! never widgets; views are opaque containers of named controls.
//!
//! # Architecture
//!
//! - [`control`] — [`Control`] / [`View`]: the capability surface bindings
//!   attach to.
//! - [`selection`] — [`ListSelectionModel`]: selection state over an
//!   observable list.
//! - [`convert`] — [`ConversionService`]: canonical-decimal scalar
//!   conversions between control and model shapes.
//! - [`target`] — [`BindingTarget`] and the name-based / mapping-based
//!   [`BindingTargetResolver`] strategies.
//! - [`binding`] — [`ValueBinding`], [`ListBinding`], and [`bind_target`],
//!   the entry point that installs the binding a target describes.
//!
//! # Invariants
//!
//! 1. Direction is decided by the model endpoint: writable cell →
//!    bidirectional, read-only cell → unidirectional, plain property →
//!    value-based write-back.
//! 2. A propagated change never bounces back through the link that carried
//!    it.
//! 3. `unbind` removes every listener the binding installed; `bind` and
//!    `unbind` are idempotent.
//!
//! # Failure Modes
//!
//! Configuration problems (unknown control, missing capability, unresolvable
//! path) surface as [`BindError`] at bind time. Propagation failures after
//! binding restore the previous value and are logged, never panicked on.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod binding;
pub mod control;
pub mod convert;
pub mod selection;
pub mod target;

#[cfg(test)]
pub(crate) mod fixtures;

pub use binding::{bind_target, Binding, BindingType, ListBinding, ValueBinding};
pub use control::{Control, ControlBuilder, View};
pub use convert::{ConversionService, ValueKind};
pub use selection::ListSelectionModel;
pub use target::{
    target_kind_for, BindingTarget, BindingTargetResolver, MappingBasedResolver,
    NameBasedResolver, TargetKind,
};

use weft_bean::AccessError;

/// Errors raised while resolving or installing bindings.
#[derive(Debug, Error)]
pub enum BindError {
    /// The target names a control the view does not contain.
    #[error("control '{control_id}' not found in view '{view_id}'")]
    UnknownControl { control_id: String, view_id: String },

    /// The control does not offer the capability the binding needs.
    #[error("control '{control_id}' does not support {capability}")]
    MissingCapability {
        control_id: String,
        capability: &'static str,
    },

    /// The model path hit a `Null` intermediate or an empty path.
    #[error("path '{path}' does not resolve against the model")]
    UnresolvedPath { path: String },

    /// A collection binding requires an observable list on the model side.
    #[error("path '{path}' resolves to '{type_name}', not an observable list")]
    ModelNotList {
        path: String,
        type_name: &'static str,
    },

    /// No conversion exists for the value and requested shape.
    #[error("can not convert {value} to {to}")]
    Inconvertible { value: String, to: &'static str },

    /// Property resolution failed on the model side.
    #[error(transparent)]
    Access(#[from] AccessError),
}
