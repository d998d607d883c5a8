//! The dynamic value type flowing through property access and bindings.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use weft_reactive::{ObservableList, ValueCell};

use crate::schema::Accessible;

/// A dynamically typed value.
///
/// Scalars carry their payload directly; aggregates ([`List`](Value::List),
/// [`Map`](Value::Map)) and objects are shared handles, so cloning a `Value`
/// never deep-copies an object graph. Reactive endpoints
/// ([`Cell`](Value::Cell), [`ObsList`](Value::ObsList)) wrap the handles the
/// binding engine subscribes to.
///
/// # Invariants
///
/// 1. Equality is structural for scalars and aggregates, and identity
///    (pointer) for objects and reactive handles.
/// 2. `Null` compares equal only to `Null`.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An ordered sequence, addressed by `field[index]` steps.
    List(Rc<RefCell<Vec<Value>>>),
    /// A string-keyed map, addressed by `field(key)` steps.
    Map(Rc<RefCell<BTreeMap<String, Value>>>),
    /// An object with a property schema.
    Object(Rc<RefCell<dyn Accessible>>),
    /// A reactive cell holding a value.
    Cell(ValueCell<Value>),
    /// An observable list of values.
    ObsList(ObservableList<Value>),
}

impl Value {
    /// Build a list value from plain items.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Build a map value from key/value pairs.
    #[must_use]
    pub fn map(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Wrap an object behind a shared handle.
    #[must_use]
    pub fn object(obj: impl Accessible + 'static) -> Self {
        Value::Object(Rc::new(RefCell::new(obj)))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short name for the value's runtime type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Cell(_) => "cell",
            Value::ObsList(_) => "observable-list",
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Rc<RefCell<dyn Accessible>>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Cell(a), Value::Cell(b)) => a.ptr_eq(b),
            (Value::ObsList(a), Value::ObsList(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(items) => write!(f, "List({:?})", items.borrow()),
            Value::Map(entries) => write!(f, "Map({:?})", entries.borrow()),
            Value::Object(obj) => write!(f, "Object({})", obj.borrow().schema().name),
            Value::Cell(cell) => write!(f, "Cell({:?})", cell.get()),
            Value::ObsList(list) => write!(f, "ObsList({:?})", list.to_vec()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
