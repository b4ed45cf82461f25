use std::rc::Rc;

use indexmap::IndexSet;

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::Slot;
use crate::graph::{Node, Phase};

/// A fixed value. Receiving an identical value again publishes nothing.
pub(crate) struct Constant;

impl Behavior for Constant {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::Value(value) = node.props() else {
            return Err(mismatch(node));
        };
        if node.phase() != Phase::Constructing && value.same(&node.value()) {
            return Ok(Output::Unchanged);
        }
        Ok(Output::Value(value))
    }

    fn refresh(&mut self, _node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        Ok(Output::Unchanged)
    }

    fn dispose(&mut self, _node: &Rc<Node>) {}
}
