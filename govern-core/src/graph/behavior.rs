//! Node behaviors.
//!
//! The engine in [`node`](super::node) owns the lifecycle: queueing, phases,
//! commit, notification, failure routing and disposal. What a node actually
//! computes is supplied by a [`Behavior`]: one per built-in kind, plus the
//! adapter that runs a user component's hooks.

use std::rc::Rc;

use indexmap::IndexSet;

use super::node::Node;
use super::slot::Slot;
use crate::element::Props;
use crate::error::{Error, Result};
use crate::value::Value;

/// Result of a render or refresh.
#[derive(Debug)]
pub(crate) enum Output {
    /// Commit this value and notify.
    Value(Value),
    /// Keep the committed value; nothing to notify.
    Unchanged,
}

/// Node configuration as it stood before an update.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub props: Props,
    pub state: Value,
    pub value: Value,
}

pub(crate) trait Behavior {
    fn initial_state(&mut self, _props: &Props) -> Value {
        Value::Null
    }

    /// Runs before new props are committed. Not called on mount.
    fn will_receive_props(&mut self, _node: &Rc<Node>, _next: &Props) -> Result<()> {
        Ok(())
    }

    /// A patch merged over the next state, computed purely.
    fn derive_state(&self, _props: &Props, _state: &Value) -> Option<Value> {
        None
    }

    fn should_update(&mut self, _node: &Rc<Node>, _props: &Props, _state: &Value) -> bool {
        true
    }

    /// Reconcile children against the node's current props and state.
    fn render(&mut self, node: &Rc<Node>) -> Result<Output>;

    /// Recompute from children, of which `changed` settled on new values.
    fn refresh(&mut self, node: &Rc<Node>, changed: &IndexSet<Slot>) -> Result<Output>;

    /// A child failed and has already been disposed. Returning `Ok` means the
    /// failure was handled and the node continues with the slot empty.
    fn child_failed(&mut self, node: &Rc<Node>, _slot: &Slot, error: Error) -> Result<()> {
        Err(Error::child(node.name(), error))
    }

    fn did_mount(&mut self, _node: &Rc<Node>) -> Result<()> {
        Ok(())
    }

    fn did_update(&mut self, _node: &Rc<Node>, _previous: &Snapshot) -> Result<()> {
        Ok(())
    }

    /// Release children and external resources.
    fn dispose(&mut self, node: &Rc<Node>);
}

/// Configuration error for a node whose props do not match its behavior.
pub(crate) fn mismatch(node: &Node) -> Error {
    Error::configuration(format!(
        "`{}` node holds props {:?}",
        node.name(),
        node.props()
    ))
}
