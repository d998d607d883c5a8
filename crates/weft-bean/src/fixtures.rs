//! Shared test fixtures: small schema-carrying types.

use std::any::Any;

use weft_reactive::ValueCell;

use crate::schema::{Accessible, ClassSchema, PropertyDescriptor};
use crate::value::Value;

pub(crate) struct Address {
    pub city: String,
}

static ADDRESS_SCHEMA: ClassSchema = ClassSchema {
    name: "Address",
    properties: &[PropertyDescriptor {
        name: "city",
        value_type: "string",
        getter: Some(|obj| {
            let a = obj.as_any().downcast_ref::<Address>().expect("Address");
            Value::from(a.city.clone())
        }),
        setter: Some(|obj, v| {
            let a = obj.as_any_mut().downcast_mut::<Address>().expect("Address");
            if let Value::Str(s) = v {
                a.city = s;
            }
        }),
        cell: None,
        field_get: None,
        field_set: None,
    }],
};

impl Accessible for Address {
    fn schema(&self) -> &'static ClassSchema {
        &ADDRESS_SCHEMA
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub write_only: String,
    pub selected: ValueCell<Value>,
    pub address: Value,
    pub tags: Value,
    pub attributes: Value,
    pub contacts: Value,
}

fn cust(obj: &dyn Accessible) -> &Customer {
    obj.as_any().downcast_ref::<Customer>().expect("Customer")
}

fn cust_mut(obj: &mut dyn Accessible) -> &mut Customer {
    obj.as_any_mut().downcast_mut::<Customer>().expect("Customer")
}

// The getter and setter for firstName decorate the value so tests can tell
// which accessor column won the resolution.
static CUSTOMER_SCHEMA: ClassSchema = ClassSchema {
    name: "Customer",
    properties: &[
        PropertyDescriptor {
            name: "firstName",
            value_type: "string",
            getter: Some(|obj| Value::from(format!("via-getter:{}", cust(obj).first_name))),
            setter: Some(|obj, v| {
                if let Value::Str(s) = v {
                    cust_mut(obj).first_name = format!("via-setter:{s}");
                }
            }),
            cell: None,
            field_get: Some(|obj| Value::from(cust(obj).first_name.clone())),
            field_set: Some(|obj, v| {
                if let Value::Str(s) = v {
                    cust_mut(obj).first_name = s;
                }
            }),
        },
        PropertyDescriptor {
            name: "lastName",
            value_type: "string",
            getter: None,
            setter: None,
            cell: None,
            field_get: Some(|obj| Value::from(cust(obj).last_name.clone())),
            field_set: Some(|obj, v| {
                if let Value::Str(s) = v {
                    cust_mut(obj).last_name = s;
                }
            }),
        },
        PropertyDescriptor {
            name: "age",
            value_type: "int",
            getter: Some(|obj| Value::Int(cust(obj).age)),
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "writeOnly",
            value_type: "string",
            getter: None,
            setter: Some(|obj, v| {
                if let Value::Str(s) = v {
                    cust_mut(obj).write_only = s;
                }
            }),
            cell: None,
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "selected",
            value_type: "bool",
            getter: Some(|obj| cust(obj).selected.get()),
            setter: None,
            cell: Some(|obj| Some(cust(obj).selected.clone())),
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "address",
            value_type: "object",
            getter: None,
            setter: None,
            cell: None,
            field_get: Some(|obj| cust(obj).address.clone()),
            field_set: Some(|obj, v| cust_mut(obj).address = v),
        },
        PropertyDescriptor {
            name: "tags",
            value_type: "list",
            getter: Some(|obj| cust(obj).tags.clone()),
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "attributes",
            value_type: "map",
            getter: Some(|obj| cust(obj).attributes.clone()),
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "contacts",
            value_type: "list",
            getter: Some(|obj| cust(obj).contacts.clone()),
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        },
    ],
};

impl Accessible for Customer {
    fn schema(&self) -> &'static ClassSchema {
        &CUSTOMER_SCHEMA
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn customer() -> Value {
    Value::object(Customer {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        age: 36,
        write_only: String::new(),
        selected: ValueCell::new(Value::Bool(false)),
        address: Value::object(Address {
            city: "London".into(),
        }),
        tags: Value::list(vec![Value::from("analyst"), Value::from("pioneer")]),
        attributes: Value::map([("tier".to_owned(), Value::from("gold"))]),
        contacts: Value::list(vec![
            Value::object(Address {
                city: "Paris".into(),
            }),
            Value::object(Address {
                city: "Turin".into(),
            }),
        ]),
    })
}

pub(crate) fn customer_without_address() -> Value {
    let value = customer();
    {
        let obj = value.as_object().expect("object").clone();
        let mut guard = obj.borrow_mut();
        guard
            .as_any_mut()
            .downcast_mut::<Customer>()
            .expect("Customer")
            .address = Value::Null;
    }
    value
}

/// A type whose schema declares a cell accessor that yields nothing.
pub(crate) struct DetachedCustomer;

static DETACHED_SCHEMA: ClassSchema = ClassSchema {
    name: "DetachedCustomer",
    properties: &[PropertyDescriptor {
        name: "selected",
        value_type: "bool",
        getter: None,
        setter: None,
        cell: Some(|_| None),
        field_get: None,
        field_set: None,
    }],
};

impl Accessible for DetachedCustomer {
    fn schema(&self) -> &'static ClassSchema {
        &DETACHED_SCHEMA
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn broken_cell_customer() -> Value {
    Value::object(DetachedCustomer)
}
