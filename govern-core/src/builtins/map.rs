use std::rc::Rc;

use indexmap::IndexSet;

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::{ChildSlot, Slot};
use crate::graph::Node;

pub(crate) struct MapNode {
    source: ChildSlot,
}

impl MapNode {
    pub fn new() -> Self {
        Self {
            source: ChildSlot::new(Slot::Source),
        }
    }

    fn project(&self, node: &Node) -> Result<Output> {
        let Props::Map { to, .. } = node.props() else {
            return Err(mismatch(node));
        };
        Ok(Output::Value(to(&self.source.value())))
    }
}

impl Behavior for MapNode {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::Map { from, .. } = node.props() else {
            return Err(mismatch(node));
        };
        self.source.reconcile(node, (*from).into_element())?;
        self.project(node)
    }

    fn refresh(&mut self, node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        self.project(node)
    }

    fn dispose(&mut self, _node: &Rc<Node>) {
        self.source.clear();
    }
}
