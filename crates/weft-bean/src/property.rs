//! Single-step property access and bound property references.

use std::cell::RefCell;
use std::rc::Rc;

use weft_path::{PathError, PathStep, StepKind};
use weft_reactive::ValueCell;

use crate::schema::{Accessible, PropertyDescriptor};
use crate::value::Value;
use crate::AccessError;

/// One named property of an object, optionally with a positional or keyed
/// suffix.
///
/// Reads resolve through the schema getter first, then through direct field
/// access; writes mirror this with the setter first. The reactive-cell
/// accessor is a third, independent column consulted only by [`cell`].
///
/// A `Null` target short-circuits: reads yield `Null`, writes are a no-op.
///
/// [`cell`]: BeanProperty::cell
#[derive(Debug, Clone)]
pub struct BeanProperty {
    step: PathStep,
}

impl BeanProperty {
    #[must_use]
    pub fn new(step: PathStep) -> Self {
        Self { step }
    }

    /// Parse a single step expression such as `name`, `items[2]`, or
    /// `attributes(key)`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        Ok(Self::new(PathStep::parse(raw)?))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.step.name()
    }

    #[must_use]
    pub fn step(&self) -> &PathStep {
        &self.step
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.step.is_indexed()
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.step.is_mapped()
    }

    // ---- capability queries ------------------------------------------------

    #[must_use]
    pub fn is_readable(&self, target: &Value) -> bool {
        self.descriptor_of(target)
            .is_some_and(|d| d.is_readable())
    }

    #[must_use]
    pub fn is_writable(&self, target: &Value) -> bool {
        self.descriptor_of(target)
            .is_some_and(|d| d.is_writable())
    }

    #[must_use]
    pub fn has_cell(&self, target: &Value) -> bool {
        self.descriptor_of(target).is_some_and(|d| d.has_cell())
    }

    /// The declared value type of the property, when the target has a schema
    /// entry for it.
    #[must_use]
    pub fn value_type(&self, target: &Value) -> Option<&'static str> {
        self.descriptor_of(target).map(|d| d.value_type)
    }

    fn descriptor_of(&self, target: &Value) -> Option<&'static PropertyDescriptor> {
        let obj = target.as_object()?;
        obj.borrow().schema().property(self.step.name())
    }

    // ---- reads -------------------------------------------------------------

    /// Read the property off `target`, applying the index or key suffix.
    pub fn get_value(&self, target: &Value) -> Result<Value, AccessError> {
        let obj = match target {
            Value::Null => return Ok(Value::Null),
            Value::Object(obj) => obj,
            other => {
                return Err(AccessError::NotTraversable {
                    property: self.step.name().to_owned(),
                    type_name: other.type_name(),
                });
            }
        };
        let raw = self.read_raw(obj)?;
        self.apply_suffix(raw)
    }

    /// Read the property off `target` without applying any suffix.
    pub fn get_raw(&self, target: &Value) -> Result<Value, AccessError> {
        match target {
            Value::Null => Ok(Value::Null),
            Value::Object(obj) => self.read_raw(obj),
            other => Err(AccessError::NotTraversable {
                property: self.step.name().to_owned(),
                type_name: other.type_name(),
            }),
        }
    }

    fn read_raw(&self, obj: &Rc<RefCell<dyn Accessible>>) -> Result<Value, AccessError> {
        let guard = obj.borrow();
        let schema = guard.schema();
        // Getter first, direct field access second.
        let read = schema
            .property(self.step.name())
            .and_then(|d| d.getter.or(d.field_get))
            .ok_or_else(|| AccessError::NotReadable {
                class: schema.name,
                property: self.step.name().to_owned(),
            })?;
        Ok(read(&*guard))
    }

    fn apply_suffix(&self, raw: Value) -> Result<Value, AccessError> {
        match self.step.kind() {
            StepKind::Plain => Ok(raw),
            StepKind::Indexed(index) => match raw {
                Value::Null => Ok(Value::Null),
                Value::List(items) => {
                    Ok(items.borrow().get(*index).cloned().unwrap_or(Value::Null))
                }
                Value::ObsList(items) => Ok(items.get(*index).unwrap_or(Value::Null)),
                other => Err(AccessError::NotIndexed {
                    property: self.step.name().to_owned(),
                    type_name: other.type_name(),
                }),
            },
            StepKind::Keyed(key) => match raw {
                Value::Null => Ok(Value::Null),
                // Absent keys read as null, not as an error.
                Value::Map(entries) => {
                    Ok(entries.borrow().get(key).cloned().unwrap_or(Value::Null))
                }
                other => Err(AccessError::NotKeyed {
                    property: self.step.name().to_owned(),
                    type_name: other.type_name(),
                }),
            },
        }
    }

    // ---- writes ------------------------------------------------------------

    /// Write `value` into the property on `target`, honoring the index or
    /// key suffix.
    pub fn set_value(&self, target: &Value, value: Value) -> Result<(), AccessError> {
        let obj = match target {
            Value::Null => return Ok(()),
            Value::Object(obj) => obj,
            other => {
                return Err(AccessError::NotTraversable {
                    property: self.step.name().to_owned(),
                    type_name: other.type_name(),
                });
            }
        };
        match self.step.kind() {
            StepKind::Plain => self.write_raw(obj, value),
            StepKind::Indexed(index) => {
                let raw = self.read_raw(obj)?;
                match raw {
                    Value::Null => Ok(()),
                    Value::List(items) => {
                        let mut items = items.borrow_mut();
                        let len = items.len();
                        let slot =
                            items
                                .get_mut(*index)
                                .ok_or_else(|| AccessError::IndexOutOfBounds {
                                    property: self.step.name().to_owned(),
                                    index: *index,
                                    len,
                                })?;
                        *slot = value;
                        Ok(())
                    }
                    Value::ObsList(items) => {
                        if *index >= items.len() {
                            return Err(AccessError::IndexOutOfBounds {
                                property: self.step.name().to_owned(),
                                index: *index,
                                len: items.len(),
                            });
                        }
                        items.set(*index, value);
                        Ok(())
                    }
                    other => Err(AccessError::NotIndexed {
                        property: self.step.name().to_owned(),
                        type_name: other.type_name(),
                    }),
                }
            }
            StepKind::Keyed(key) => {
                let raw = self.read_raw(obj)?;
                match raw {
                    Value::Null => Ok(()),
                    Value::Map(entries) => {
                        entries.borrow_mut().insert(key.clone(), value);
                        Ok(())
                    }
                    other => Err(AccessError::NotKeyed {
                        property: self.step.name().to_owned(),
                        type_name: other.type_name(),
                    }),
                }
            }
        }
    }

    fn write_raw(
        &self,
        obj: &Rc<RefCell<dyn Accessible>>,
        value: Value,
    ) -> Result<(), AccessError> {
        let mut guard = obj.borrow_mut();
        let schema = guard.schema();
        // Setter first, direct field access second.
        let write = schema
            .property(self.step.name())
            .and_then(|d| d.setter.or(d.field_set))
            .ok_or_else(|| AccessError::NotWritable {
                class: schema.name,
                property: self.step.name().to_owned(),
            })?;
        write(&mut *guard, value);
        Ok(())
    }

    // ---- reactive cell -------------------------------------------------------

    /// The reactive cell behind the property.
    ///
    /// Fails with [`AccessError::NoPropertyGetter`] when the schema declares
    /// no cell accessor and with [`AccessError::NullPropertyCell`] when the
    /// accessor yields none on this instance.
    pub fn cell(&self, target: &Value) -> Result<ValueCell<Value>, AccessError> {
        let obj = match target {
            Value::Object(obj) => obj,
            other => {
                return Err(AccessError::NotTraversable {
                    property: self.step.name().to_owned(),
                    type_name: other.type_name(),
                });
            }
        };
        let guard = obj.borrow();
        let schema = guard.schema();
        let desc = schema
            .property(self.step.name())
            .ok_or_else(|| AccessError::NoPropertyGetter {
                class: schema.name,
                property: self.step.name().to_owned(),
            })?;
        let accessor = desc.cell.ok_or_else(|| AccessError::NoPropertyGetter {
            class: schema.name,
            property: self.step.name().to_owned(),
        })?;
        accessor(&*guard).ok_or_else(|| AccessError::NullPropertyCell {
            class: schema.name,
            property: self.step.name().to_owned(),
        })
    }
}

/// A property bound to the object instance it lives on.
///
/// Construction fails fast when the schema declares a cell accessor but the
/// instance's accessor yields no cell.
#[derive(Debug, Clone)]
pub struct PropertyReference {
    target: Value,
    property: BeanProperty,
}

impl PropertyReference {
    pub fn new(target: Value, property: BeanProperty) -> Result<Self, AccessError> {
        if property.has_cell(&target) {
            property.cell(&target)?;
        }
        Ok(Self { target, property })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.property.name()
    }

    #[must_use]
    pub fn target(&self) -> &Value {
        &self.target
    }

    #[must_use]
    pub fn property(&self) -> &BeanProperty {
        &self.property
    }

    pub fn get_value(&self) -> Result<Value, AccessError> {
        self.property.get_value(&self.target)
    }

    pub fn set_value(&self, value: Value) -> Result<(), AccessError> {
        self.property.set_value(&self.target, value)
    }

    pub fn cell(&self) -> Result<ValueCell<Value>, AccessError> {
        self.property.cell(&self.target)
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.property.is_indexed()
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.property.is_mapped()
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.property.is_readable(&self.target)
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.property.is_writable(&self.target)
    }

    #[must_use]
    pub fn has_cell(&self) -> bool {
        self.property.has_cell(&self.target)
    }

    #[must_use]
    pub fn value_type(&self) -> Option<&'static str> {
        self.property.value_type(&self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{broken_cell_customer, customer, Customer};

    fn prop(raw: &str) -> BeanProperty {
        BeanProperty::parse(raw).unwrap()
    }

    // ---- resolution order ---------------------------------------------------

    #[test]
    fn getter_wins_over_field() {
        let target = customer();
        // firstName exposes both a getter and direct field access; the
        // getter decorates the value so the winner is observable.
        let value = prop("firstName").get_value(&target).unwrap();
        assert_eq!(value, Value::from("via-getter:Ada"));
    }

    #[test]
    fn field_fallback_when_no_getter() {
        let target = customer();
        let value = prop("lastName").get_value(&target).unwrap();
        assert_eq!(value, Value::from("Lovelace"));
    }

    #[test]
    fn unreadable_property_names_class_and_property() {
        let target = customer();
        let err = prop("writeOnly").get_value(&target).unwrap_err();
        assert_eq!(
            err.to_string(),
            "property 'writeOnly' in class 'Customer' has no getter, no property-getter and \
             can not be resolved to a field"
        );
    }

    #[test]
    fn setter_wins_then_field_then_error() {
        let target = customer();
        prop("firstName").set_value(&target, Value::from("Grace")).unwrap();
        prop("lastName").set_value(&target, Value::from("Hopper")).unwrap();
        let err = prop("age").set_value(&target, Value::from(1)).unwrap_err();
        assert!(matches!(err, AccessError::NotWritable { .. }));

        let obj = target.as_object().unwrap().borrow();
        let c = obj.as_any().downcast_ref::<Customer>().unwrap();
        assert_eq!(c.first_name, "via-setter:Grace");
        assert_eq!(c.last_name, "Hopper");
    }

    #[test]
    fn unknown_property_is_unreadable() {
        let target = customer();
        assert!(matches!(
            prop("nope").get_value(&target),
            Err(AccessError::NotReadable { .. })
        ));
    }

    // ---- suffixes -------------------------------------------------------------

    #[test]
    fn indexed_read_and_write() {
        let target = customer();
        let p = prop("tags[1]");
        assert!(p.is_indexed());
        assert_eq!(p.get_value(&target).unwrap(), Value::from("pioneer"));

        p.set_value(&target, Value::from("mathematician")).unwrap();
        assert_eq!(p.get_value(&target).unwrap(), Value::from("mathematician"));
    }

    #[test]
    fn out_of_range_index_reads_null_but_refuses_write() {
        let target = customer();
        let p = prop("tags[99]");
        assert_eq!(p.get_value(&target).unwrap(), Value::Null);
        assert!(matches!(
            p.set_value(&target, Value::from("x")),
            Err(AccessError::IndexOutOfBounds { index: 99, .. })
        ));
    }

    #[test]
    fn keyed_read_write_and_absent_key() {
        let target = customer();
        assert_eq!(
            prop("attributes(tier)").get_value(&target).unwrap(),
            Value::from("gold")
        );
        assert_eq!(
            prop("attributes(missing)").get_value(&target).unwrap(),
            Value::Null
        );

        prop("attributes(tier)").set_value(&target, Value::from("platinum")).unwrap();
        assert_eq!(
            prop("attributes(tier)").get_value(&target).unwrap(),
            Value::from("platinum")
        );
    }

    #[test]
    fn index_suffix_on_scalar_is_an_error() {
        let target = customer();
        assert!(matches!(
            prop("age[0]").get_value(&target),
            Err(AccessError::NotIndexed { .. })
        ));
    }

    // ---- null short-circuit ----------------------------------------------------

    #[test]
    fn null_target_reads_null_and_swallows_writes() {
        let p = prop("anything");
        assert_eq!(p.get_value(&Value::Null).unwrap(), Value::Null);
        p.set_value(&Value::Null, Value::from(1)).unwrap();
    }

    // ---- reactive cell -----------------------------------------------------------

    #[test]
    fn cell_accessor_is_independent_of_getter() {
        let target = customer();
        let cell = prop("selected").cell(&target).unwrap();
        assert_eq!(cell.get(), Value::Bool(false));

        cell.set(Value::Bool(true));
        assert_eq!(
            prop("selected").get_value(&target).unwrap(),
            Value::Bool(true),
            "getter reads through the cell"
        );
    }

    #[test]
    fn missing_cell_accessor_fails_only_on_cell_request() {
        let target = customer();
        let p = prop("firstName");
        assert!(p.get_value(&target).is_ok());
        assert!(matches!(
            p.cell(&target),
            Err(AccessError::NoPropertyGetter { .. })
        ));
    }

    #[test]
    fn reference_fails_fast_on_absent_cell() {
        let err =
            PropertyReference::new(broken_cell_customer(), prop("selected")).unwrap_err();
        assert!(matches!(err, AccessError::NullPropertyCell { .. }));
    }

    #[test]
    fn reference_surface() {
        let target = customer();
        let r = PropertyReference::new(target, prop("firstName")).unwrap();
        assert!(r.is_readable());
        assert!(r.is_writable());
        assert!(!r.is_indexed());
        assert!(!r.is_mapped());
        assert!(!r.has_cell());
        assert_eq!(r.value_type(), Some("string"));
        assert_eq!(r.get_value().unwrap(), Value::from("via-getter:Ada"));
    }
}
