//! Static property schemas: the introspection surface of an object.
//!
//! Instead of runtime reflection, every addressable type carries a
//! `&'static ClassSchema` of plain function-pointer accessors. The table is
//! data, so property resolution stays enumerable and testable.

use std::any::Any;

use weft_reactive::ValueCell;

use crate::value::Value;

/// Reads a property through its conventional getter or directly off a field.
pub type Getter = fn(&dyn Accessible) -> Value;
/// Writes a property through its conventional setter or directly into a field.
pub type Setter = fn(&mut dyn Accessible, Value);
/// Returns the reactive cell behind a property, when the instance has one.
pub type CellGetter = fn(&dyn Accessible) -> Option<ValueCell<Value>>;

/// Accessor table for one named property.
///
/// The four accessor columns are independent: a property may expose any
/// combination of getter, setter, cell getter, and direct field access. The
/// read resolution order is getter, then field; writes use setter, then
/// field; the cell getter is consulted only when a caller asks for the cell.
#[derive(Clone, Copy)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    /// Short name of the property's value type, surfaced by references.
    pub value_type: &'static str,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
    pub cell: Option<CellGetter>,
    pub field_get: Option<Getter>,
    pub field_set: Option<Setter>,
}

impl PropertyDescriptor {
    /// A descriptor with no accessors, to be filled field by field.
    pub const fn named(name: &'static str, value_type: &'static str) -> Self {
        Self {
            name,
            value_type,
            getter: None,
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        }
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.getter.is_some() || self.field_get.is_some()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some() || self.field_set.is_some()
    }

    #[must_use]
    pub fn has_cell(&self) -> bool {
        self.cell.is_some()
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .field("cell", &self.has_cell())
            .finish()
    }
}

/// The full property table of a type, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct ClassSchema {
    pub name: &'static str,
    pub properties: &'static [PropertyDescriptor],
}

impl ClassSchema {
    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &'static str> {
        self.properties.iter().map(|p| p.name)
    }
}

/// An object whose properties can be addressed by name.
pub trait Accessible {
    /// The static property table of the concrete type.
    fn schema(&self) -> &'static ClassSchema;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
