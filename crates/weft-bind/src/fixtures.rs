//! Shared test fixtures: a small form model and a matching view.

use std::any::Any;

use weft_bean::{Accessible, ClassSchema, PropertyDescriptor, Value};
use weft_reactive::{ObservableList, ValueCell};

use crate::control::{Control, View};
use crate::selection::ListSelectionModel;

pub(crate) struct FormModel {
    pub name: ValueCell<Value>,
    pub status: ValueCell<Value>,
    pub note: String,
    pub count: i64,
    pub choice: ValueCell<Value>,
    pub entries: ObservableList<Value>,
    pub version: ValueCell<Value>,
}

fn model(obj: &dyn Accessible) -> &FormModel {
    obj.as_any().downcast_ref::<FormModel>().expect("FormModel")
}

fn model_mut(obj: &mut dyn Accessible) -> &mut FormModel {
    obj.as_any_mut()
        .downcast_mut::<FormModel>()
        .expect("FormModel")
}

static FORM_SCHEMA: ClassSchema = ClassSchema {
    name: "FormModel",
    properties: &[
        PropertyDescriptor {
            name: "name",
            value_type: "string",
            getter: Some(|obj| model(obj).name.get()),
            setter: None,
            cell: Some(|obj| Some(model(obj).name.clone())),
            field_get: None,
            field_set: None,
        },
        // Read-only cell over a bean that still carries a setter, like a
        // ReadOnly*Wrapper exposed next to its set method.
        PropertyDescriptor {
            name: "status",
            value_type: "string",
            getter: Some(|obj| model(obj).status.get()),
            setter: Some(|obj, v| model_mut(obj).status.set(v)),
            cell: Some(|obj| Some(model(obj).status.clone())),
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "note",
            value_type: "string",
            getter: None,
            setter: None,
            cell: None,
            field_get: Some(|obj| Value::from(model(obj).note.clone())),
            field_set: Some(|obj, v| {
                if let Value::Str(s) = v {
                    model_mut(obj).note = s;
                }
            }),
        },
        PropertyDescriptor {
            name: "count",
            value_type: "int",
            getter: None,
            setter: None,
            cell: None,
            field_get: Some(|obj| Value::Int(model(obj).count)),
            field_set: Some(|obj, v| {
                if let Value::Int(i) = v {
                    model_mut(obj).count = i;
                }
            }),
        },
        PropertyDescriptor {
            name: "choice",
            value_type: "string",
            getter: Some(|obj| model(obj).choice.get()),
            setter: None,
            cell: Some(|obj| Some(model(obj).choice.clone())),
            field_get: None,
            field_set: None,
        },
        PropertyDescriptor {
            name: "entries",
            value_type: "list",
            getter: Some(|obj| Value::ObsList(model(obj).entries.clone())),
            setter: None,
            cell: None,
            field_get: None,
            field_set: None,
        },
        // Read-only cell with no write path at all.
        PropertyDescriptor {
            name: "version",
            value_type: "string",
            getter: Some(|obj| model(obj).version.get()),
            setter: None,
            cell: Some(|obj| Some(model(obj).version.clone())),
            field_get: None,
            field_set: None,
        },
    ],
};

impl Accessible for FormModel {
    fn schema(&self) -> &'static ClassSchema {
        &FORM_SCHEMA
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn form_model() -> Value {
    Value::object(FormModel {
        name: ValueCell::new(Value::from("Hello World")),
        status: ValueCell::read_only(Value::from("ok")),
        note: "draft".to_owned(),
        count: 7,
        choice: ValueCell::new(Value::Null),
        entries: ObservableList::from_vec(vec![Value::from("a"), Value::from("b")]),
        version: ValueCell::read_only(Value::from("v1")),
    })
}

pub(crate) fn form_view() -> View {
    View::new(
        "formView",
        vec![
            Control::builder("name")
                .value(ValueCell::new(Value::Null))
                .build(),
            Control::builder("status")
                .value(ValueCell::new(Value::Null))
                .build(),
            Control::builder("note")
                .value(ValueCell::new(Value::Null))
                .build(),
            Control::builder("count")
                .value(ValueCell::new(Value::Null))
                .build(),
            Control::builder("choice")
                .items(ObservableList::from_vec(vec![
                    Value::from("red"),
                    Value::from("green"),
                ]))
                .selection(ListSelectionModel::single())
                .build(),
            Control::builder("entries")
                .items(ObservableList::new())
                .selection(ListSelectionModel::multi())
                .build(),
            Control::builder("version")
                .value(ValueCell::new(Value::Null))
                .build(),
        ],
    )
}
