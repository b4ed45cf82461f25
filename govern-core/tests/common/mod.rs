//! Shared test fixtures.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use govern_core::{Component, Renderable, Subscriber, Value};

/// Records everything a subscriber observes, in order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
    values: Rc<RefCell<Vec<Value>>>,
}

impl Recorder {
    pub fn subscriber(&self) -> Subscriber {
        let (values, on_value) = (self.values.clone(), self.events.clone());
        let (on_error, on_complete) = (self.events.clone(), self.events.clone());
        let (on_start, on_end) = (self.events.clone(), self.events.clone());

        Subscriber::new(move |v| {
            values.borrow_mut().push(v.clone());
            on_value.borrow_mut().push("value".into());
        })
        .on_error(move |e| on_error.borrow_mut().push(format!("error {}", e.code())))
        .on_complete(move || on_complete.borrow_mut().push("complete".into()))
        .on_transaction_start(move || on_start.borrow_mut().push("start".into()))
        .on_transaction_end(move || on_end.borrow_mut().push("end".into()))
    }

    pub fn values(&self) -> Vec<Value> {
        self.values.borrow().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn value_count(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
        self.values.borrow_mut().clear();
    }
}

/// Shared call counter.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

/// Shared ordered log.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A component holding `{count}` and exposing `{count, increase}`.
pub fn counter() -> Rc<Component> {
    Rc::new(
        Component::new("Counter", |cx| {
            let count = cx.state()["count"].as_i64().unwrap_or(0);
            let increase = cx.action(move |cx| cx.set_state(Value::map([("count", count + 1)])));
            Ok(Renderable::from(Value::map([
                ("count", Value::Int(count)),
                ("increase", increase),
            ])))
        })
        .initial_state(|_| Value::map([("count", 0)])),
    )
}

/// A component rendering its `value` prop, logging mounts and disposals
/// under `label`.
pub fn probe(label: &'static str, log: &Log) -> Rc<Component> {
    let (mounted, disposed) = (log.clone(), log.clone());
    Rc::new(
        Component::new(label, |cx| Ok(Renderable::from(cx.props()["value"].clone())))
            .did_mount(move |_| {
                mounted.push(format!("mount {label}"));
                Ok(())
            })
            .will_dispose(move |_| disposed.push(format!("dispose {label}"))),
    )
}
