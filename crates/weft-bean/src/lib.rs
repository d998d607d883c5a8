//! Dynamic values and schema-driven property access.
//!
//! This crate resolves property-path expressions against object graphs. A
//! graph node is a [`Value`]; objects carry a static [`ClassSchema`] of
//! accessor tables instead of runtime reflection.
//!
//! # Architecture
//!
//! - [`value`] — the dynamic [`Value`] type (scalars, aggregates, objects,
//!   reactive handles).
//! - [`schema`] — [`Accessible`], [`ClassSchema`], [`PropertyDescriptor`]:
//!   per-type accessor tables as plain function pointers.
//! - [`property`] — [`BeanProperty`] (single-step access with the fixed
//!   getter → field resolution order) and [`PropertyReference`] (a property
//!   bound to its owning instance).
//! - [`wrapper`] — [`BeanWrapper`]: whole-path resolution with null
//!   short-circuiting.
//!
//! # Invariants
//!
//! 1. Reads resolve getter first, then direct field; writes resolve setter
//!    first, then direct field. Neither present is an error naming the
//!    property and class.
//! 2. The reactive-cell accessor is independent: its absence only matters
//!    when a caller asks for the cell.
//! 3. A `Null` anywhere along a path short-circuits reads to `Null` and
//!    swallows writes; it is never an error.
//! 4. Absent map keys read as `Null`.
//!
//! # Failure Modes
//!
//! All failures are [`AccessError`] values; none panic. Parse failures from
//! the path grammar pass through as [`AccessError::Path`].

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod property;
pub mod schema;
pub mod value;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod fixtures;

pub use property::{BeanProperty, PropertyReference};
pub use schema::{Accessible, CellGetter, ClassSchema, Getter, PropertyDescriptor, Setter};
pub use value::Value;
pub use wrapper::BeanWrapper;

use weft_path::PathError;

/// Errors raised while resolving or mutating properties.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    /// The property cannot be read on this type.
    #[error(
        "property '{property}' in class '{class}' has no getter, no property-getter and can \
         not be resolved to a field"
    )]
    NotReadable {
        class: &'static str,
        property: String,
    },

    /// The property cannot be written on this type.
    #[error(
        "property '{property}' in class '{class}' has no setter and can not be resolved to \
         a field"
    )]
    NotWritable {
        class: &'static str,
        property: String,
    },

    /// A reactive cell was requested but the schema declares no cell
    /// accessor.
    #[error("property '{property}' in class '{class}' does not expose a property-getter")]
    NoPropertyGetter {
        class: &'static str,
        property: String,
    },

    /// The schema declares a cell accessor but the instance yields no cell.
    #[error("property-getter for '{property}' in class '{class}' returned no cell")]
    NullPropertyCell {
        class: &'static str,
        property: String,
    },

    /// An index suffix was applied to a non-sequence value.
    #[error("property '{property}' of type '{type_name}' does not support positional access")]
    NotIndexed {
        property: String,
        type_name: &'static str,
    },

    /// A key suffix was applied to a non-map value.
    #[error("property '{property}' of type '{type_name}' does not support keyed access")]
    NotKeyed {
        property: String,
        type_name: &'static str,
    },

    /// A positional write past the end of the sequence.
    #[error("index {index} out of bounds for property '{property}' of length {len}")]
    IndexOutOfBounds {
        property: String,
        index: usize,
        len: usize,
    },

    /// Property access attempted on a value without a schema.
    #[error("value of type '{type_name}' has no addressable property '{property}'")]
    NotTraversable {
        property: String,
        type_name: &'static str,
    },

    /// The path expression itself is malformed.
    #[error(transparent)]
    Path(#[from] PathError),
}
