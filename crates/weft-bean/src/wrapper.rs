//! Whole-path resolution against a root object.

use weft_path::PathExpression;
use weft_reactive::ValueCell;

use crate::property::{BeanProperty, PropertyReference};
use crate::value::Value;
use crate::AccessError;

/// Resolves full property paths against a root value.
///
/// The wrapper walks one step at a time. A `Null` intermediate short-circuits
/// the walk: reads yield `Null`, writes become a no-op, and cell or reference
/// resolution yields `None`. The empty path addresses the root itself.
#[derive(Debug, Clone)]
pub struct BeanWrapper {
    root: Value,
}

impl BeanWrapper {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Read the value at `path`.
    pub fn get_property_value(&self, path: &str) -> Result<Value, AccessError> {
        let mut current = self.root.clone();
        for step in PathExpression::new(path).steps() {
            if current.is_null() {
                return Ok(Value::Null);
            }
            current = BeanProperty::new(step?).get_value(&current)?;
        }
        Ok(current)
    }

    /// Write `value` at `path`. A `Null` intermediate swallows the write.
    pub fn set_property_value(&self, path: &str, value: Value) -> Result<(), AccessError> {
        match self.walk_to_parent(path)? {
            Some((parent, last)) => last.set_value(&parent, value),
            None => Ok(()),
        }
    }

    /// The reactive cell at `path`, or `None` when a `Null` intermediate cuts
    /// the walk short.
    pub fn get_cell(&self, path: &str) -> Result<Option<ValueCell<Value>>, AccessError> {
        match self.walk_to_parent(path)? {
            Some((parent, last)) if !parent.is_null() => last.cell(&parent).map(Some),
            _ => Ok(None),
        }
    }

    /// A reference bound to the second-to-last object on the path, or `None`
    /// when a `Null` intermediate cuts the walk short.
    pub fn resolve_reference(
        &self,
        path: &str,
    ) -> Result<Option<PropertyReference>, AccessError> {
        match self.walk_to_parent(path)? {
            Some((parent, last)) if !parent.is_null() => {
                PropertyReference::new(parent, last).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Resolve every step but the last, returning the owning value and the
    /// final property. `None` for the empty path or a `Null` intermediate.
    fn walk_to_parent(&self, path: &str) -> Result<Option<(Value, BeanProperty)>, AccessError> {
        let steps = PathExpression::new(path).parse_steps()?;
        let Some((last, front)) = steps.split_last() else {
            return Ok(None);
        };
        let mut current = self.root.clone();
        for step in front {
            if current.is_null() {
                return Ok(None);
            }
            current = BeanProperty::new(step.clone()).get_value(&current)?;
        }
        if current.is_null() {
            return Ok(None);
        }
        Ok(Some((current, BeanProperty::new(last.clone()))))
    }
}
