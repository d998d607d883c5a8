//! Priority-aware publish/subscribe event bus.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tracing::{debug, error};
use weft_bean::Value;

use crate::ContainerError;

type Handler = Rc<dyn Fn(&Value) -> Result<(), ContainerError>>;
type ErrorSink = Rc<dyn Fn(&ContainerError)>;

struct BusEntry {
    id: u64,
    priority: i32,
    handler: Handler,
}

struct BusInner {
    next_id: u64,
    topics: AHashMap<String, Vec<BusEntry>>,
    error_sink: Option<ErrorSink>,
}

/// Synchronous event bus dispatching to handlers in ascending priority
/// order.
///
/// Handlers with equal priority run in subscription order. A failing handler
/// never stops dispatch; the failure goes to the configured error sink (or
/// the log when none is set).
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

/// Removes its subscription when dropped.
pub struct BusSubscription {
    bus: Weak<RefCell<BusInner>>,
    topic: String,
    id: u64,
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            let mut inner = inner.borrow_mut();
            if let Some(entries) = inner.topics.get_mut(&self.topic) {
                entries.retain(|e| e.id != self.id);
            }
        }
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                topics: AHashMap::new(),
                error_sink: None,
            })),
        }
    }

    /// Route handler failures somewhere other than the log.
    pub fn set_error_sink(&self, sink: impl Fn(&ContainerError) + 'static) {
        self.inner.borrow_mut().error_sink = Some(Rc::new(sink));
    }

    /// Subscribe `handler` to `topic`. Lower priorities run first.
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        priority: i32,
        handler: impl Fn(&Value) -> Result<(), ContainerError> + 'static,
    ) -> BusSubscription {
        let topic = topic.into();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let entries = inner.topics.entry(topic.clone()).or_default();
        // Insertion keeps ascending priority and subscription order inside
        // a priority class.
        let at = entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(entries.len());
        entries.insert(
            at,
            BusEntry {
                id,
                priority,
                handler: Rc::new(handler),
            },
        );
        debug!(topic = %topic, priority, "event handler subscribed");
        BusSubscription {
            bus: Rc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Dispatch `event` to every handler of `topic`.
    pub fn publish(&self, topic: &str, event: &Value) {
        let (handlers, sink) = {
            let inner = self.inner.borrow();
            (
                inner
                    .topics
                    .get(topic)
                    .map(|entries| {
                        entries
                            .iter()
                            .map(|e| Rc::clone(&e.handler))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default(),
                inner.error_sink.clone(),
            )
        };
        for handler in handlers {
            if let Err(e) = handler(event) {
                match &sink {
                    Some(sink) => sink(&e),
                    None => error!(topic, error = %e, "event handler failed"),
                }
            }
        }
    }

    #[must_use]
    pub fn handler_count(&self, topic: &str) -> usize {
        self.inner
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_run_in_ascending_priority_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let subs: Vec<_> = [("late", 10), ("early", -5), ("mid", 0)]
            .into_iter()
            .map(|(label, priority)| {
                let order = Rc::clone(&order);
                bus.subscribe("tick", priority, move |_| {
                    order.borrow_mut().push(label);
                    Ok(())
                })
            })
            .collect();

        bus.publish("tick", &Value::Null);
        assert_eq!(*order.borrow(), vec!["early", "mid", "late"]);
        drop(subs);
    }

    #[test]
    fn equal_priority_preserves_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = ["first", "second"]
            .into_iter()
            .map(|label| {
                let order = Rc::clone(&order);
                bus.subscribe("tick", 0, move |_| {
                    order.borrow_mut().push(label);
                    Ok(())
                })
            })
            .collect();

        bus.publish("tick", &Value::Null);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        drop(subs);
    }

    #[test]
    fn dropping_the_subscription_unsubscribes() {
        let bus = EventBus::new();
        let sub = bus.subscribe("tick", 0, |_| Ok(()));
        assert_eq!(bus.handler_count("tick"), 1);
        drop(sub);
        assert_eq!(bus.handler_count("tick"), 0);
    }

    #[test]
    fn handler_failures_reach_the_error_sink_without_stopping_dispatch() {
        let bus = EventBus::new();
        let reached = Rc::new(RefCell::new(false));
        let errors = Rc::new(RefCell::new(Vec::new()));

        let e = Rc::clone(&errors);
        bus.set_error_sink(move |err| e.borrow_mut().push(err.to_string()));

        let _s1 = bus.subscribe("tick", 0, |_| {
            Err(ContainerError::NoMatchingConstructor { type_name: "X" })
        });
        let r = Rc::clone(&reached);
        let _s2 = bus.subscribe("tick", 1, move |_| {
            *r.borrow_mut() = true;
            Ok(())
        });

        bus.publish("tick", &Value::Null);
        assert!(*reached.borrow(), "later handlers still run");
        assert_eq!(errors.borrow().len(), 1);
    }

    #[test]
    fn events_carry_their_payload() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Value::Null));
        let s = Rc::clone(&seen);
        let _sub = bus.subscribe("msg", 0, move |event| {
            *s.borrow_mut() = event.clone();
            Ok(())
        });
        bus.publish("msg", &Value::from("payload"));
        assert_eq!(*seen.borrow(), Value::from("payload"));
    }
}
