//! Runs a [`Component`]'s hooks as a node behavior.

use std::rc::Rc;

use indexmap::IndexSet;

use super::{Component, Instance, Previous};
use crate::element::{Props, Renderable};
use crate::error::{Error, Result};
use crate::graph::behavior::{Behavior, Output, Snapshot};
use crate::graph::slot::{ChildSlot, Slot};
use crate::graph::Node;
use crate::value::Value;

pub(crate) struct ComponentBehavior {
    def: Rc<Component>,
    child: ChildSlot,
    /// The last render produced a child rather than a plain value.
    renders_child: bool,
}

impl ComponentBehavior {
    pub fn new(def: Rc<Component>) -> Self {
        Self {
            def,
            child: ChildSlot::new(Slot::Main),
            renders_child: false,
        }
    }
}

fn props_value(props: &Props) -> &Value {
    const NULL: &Value = &Value::Null;
    props.as_value().unwrap_or(NULL)
}

impl Behavior for ComponentBehavior {
    fn initial_state(&mut self, props: &Props) -> Value {
        match &self.def.initial_state {
            Some(f) => f(props_value(props)),
            None => Value::Null,
        }
    }

    fn will_receive_props(&mut self, node: &Rc<Node>, next: &Props) -> Result<()> {
        match &self.def.will_receive_props {
            Some(f) => f(&Instance::new(node), props_value(next)),
            None => Ok(()),
        }
    }

    fn derive_state(&self, props: &Props, state: &Value) -> Option<Value> {
        self.def
            .derive_state
            .as_ref()
            .and_then(|f| f(props_value(props), state))
    }

    fn should_update(&mut self, node: &Rc<Node>, props: &Props, state: &Value) -> bool {
        match &self.def.should_update {
            Some(f) => f(&Instance::new(node), props_value(props), state),
            None => true,
        }
    }

    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        match (self.def.render)(&Instance::new(node))? {
            Renderable::Value(value) => {
                self.child.clear();
                self.renders_child = false;
                Ok(Output::Value(value))
            }
            rendered => {
                self.renders_child = true;
                self.child.reconcile(node, rendered.into_element())?;
                Ok(Output::Value(self.child.value()))
            }
        }
    }

    fn refresh(&mut self, _node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        if self.renders_child {
            Ok(Output::Value(self.child.value()))
        } else {
            Ok(Output::Unchanged)
        }
    }

    fn child_failed(&mut self, node: &Rc<Node>, _slot: &Slot, error: Error) -> Result<()> {
        match &self.def.did_catch {
            Some(handler) if !error.is_defect() => {
                tracing::debug!(node = %node.name(), %error, "child failure caught");
                self.child.clear();
                handler(&Instance::new(node), &error)
            }
            _ => Err(Error::child(node.name(), error)),
        }
    }

    fn did_mount(&mut self, node: &Rc<Node>) -> Result<()> {
        match &self.def.did_mount {
            Some(f) => f(&Instance::new(node)),
            None => Ok(()),
        }
    }

    fn did_update(&mut self, node: &Rc<Node>, previous: &Snapshot) -> Result<()> {
        let Some(f) = &self.def.did_update else {
            return Ok(());
        };
        let previous = Previous {
            props: props_value(&previous.props).clone(),
            state: previous.state.clone(),
            value: previous.value.clone(),
        };
        f(&Instance::new(node), &previous)
    }

    fn dispose(&mut self, node: &Rc<Node>) {
        if let Some(f) = &self.def.will_dispose {
            f(&Instance::new(node));
        }
        self.child.clear();
    }
}
