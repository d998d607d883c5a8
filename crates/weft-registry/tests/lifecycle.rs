//! End-to-end lifecycle: configure a context, let the form binding wire a
//! controller's model to its view, then release the wiring again.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use weft_bean::{Accessible, ClassSchema, PropertyDescriptor, Value};
use weft_bind::{Control, View};
use weft_reactive::ValueCell;
use weft_registry::{
    AppContext, Component, ComponentDefinition, ContainerError, Marker, Module,
};

struct Greeting {
    name: ValueCell<Value>,
}

static GREETING_SCHEMA: ClassSchema = ClassSchema {
    name: "Greeting",
    properties: &[PropertyDescriptor {
        name: "name",
        value_type: "string",
        getter: Some(|obj| {
            obj.as_any()
                .downcast_ref::<Greeting>()
                .map_or(Value::Null, |g| g.name.get())
        }),
        setter: None,
        cell: Some(|obj| {
            obj.as_any()
                .downcast_ref::<Greeting>()
                .map(|g| g.name.clone())
        }),
        field_get: None,
        field_set: None,
    }],
};

impl Accessible for Greeting {
    fn schema(&self) -> &'static ClassSchema {
        &GREETING_SCHEMA
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct GreetingController {
    view: View,
    model: Value,
    name: ValueCell<Value>,
}

impl GreetingController {
    fn new() -> Self {
        let name = ValueCell::new(Value::from("Hello World"));
        Self {
            view: View::new(
                "greetingView",
                vec![Control::builder("name")
                    .value(ValueCell::new(Value::Null))
                    .build()],
            ),
            model: Value::object(Greeting { name: name.clone() }),
            name,
        }
    }
}

impl Component for GreetingController {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn view(&self) -> Option<View> {
        Some(self.view.clone())
    }
}

fn greeting_module() -> Module {
    Module {
        name: "greeting",
        definitions: vec![|| {
            ComponentDefinition::builder::<GreetingController>("greetingController")
                .controller()
                .factory(|| Rc::new(RefCell::new(GreetingController::new())))
                .marker(Marker::FormBinding {
                    model: |c| {
                        c.as_any()
                            .downcast_ref::<GreetingController>()
                            .map_or(Value::Null, |c| c.model.clone())
                    },
                    prefix: "",
                    suffix: "",
                })
                .build()
        }],
    }
}

#[test]
fn form_binding_lives_from_initialize_to_unbind() -> Result<(), ContainerError> {
    let mut ctx = AppContext::new();
    ctx.configure(vec![greeting_module()])?;
    ctx.initialize()?;

    let controller = ctx
        .get_by_id("greetingController")?
        .expect("controller registered");
    let (view, model_cell) = {
        let guard = controller.borrow();
        let c = guard
            .as_any()
            .downcast_ref::<GreetingController>()
            .expect("GreetingController");
        (c.view.clone(), c.name.clone())
    };
    let control = view.control("name").expect("name control");
    let control_cell = control.value_cell().expect("value cell").clone();

    // Binding seeds the control from the model.
    assert_eq!(control_cell.get(), Value::from("Hello World"));

    // Model changes propagate to the control.
    model_cell.set(Value::from("Changed"));
    assert_eq!(control_cell.get(), Value::from("Changed"));

    // And back: the model cell is writable, so the binding is bidirectional.
    control_cell.set(Value::from("Typed"));
    assert_eq!(model_cell.get(), Value::from("Typed"));

    // After unbind the two sides are independent.
    ctx.registry().unbind("greetingController");
    model_cell.set(Value::from("Ignored"));
    assert_eq!(control_cell.get(), Value::from("Typed"));

    Ok(())
}

#[test]
fn retrieval_outside_the_initialized_phase_is_rejected() {
    let ctx = AppContext::new();
    let err = ctx.get_by_id("greetingController").unwrap_err();
    assert!(matches!(err, ContainerError::StateError { .. }));
}
