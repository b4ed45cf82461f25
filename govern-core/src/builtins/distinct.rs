use std::rc::Rc;

use indexmap::IndexSet;

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::{ChildSlot, Slot};
use crate::graph::Node;
use crate::value::Value;

/// Follows `from`, suppressing values equal to the last one it published.
pub(crate) struct DistinctNode {
    source: ChildSlot,
    last: Option<Value>,
}

impl DistinctNode {
    pub fn new() -> Self {
        Self {
            source: ChildSlot::new(Slot::Source),
            last: None,
        }
    }

    fn decide(&mut self, node: &Node) -> Result<Output> {
        let Props::Distinct { by, .. } = node.props() else {
            return Err(mismatch(node));
        };
        let next = self.source.value();
        let repeated = match (&self.last, &by) {
            (Some(last), Some(eq)) => eq(last, &next),
            (Some(last), None) => last.same(&next),
            (None, _) => false,
        };
        if repeated {
            tracing::trace!(node = %node.name(), "repeat suppressed");
            return Ok(Output::Unchanged);
        }
        self.last = Some(next.clone());
        Ok(Output::Value(next))
    }
}

impl Behavior for DistinctNode {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::Distinct { from, .. } = node.props() else {
            return Err(mismatch(node));
        };
        self.source.reconcile(node, (*from).into_element())?;
        self.decide(node)
    }

    fn refresh(&mut self, node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        self.decide(node)
    }

    fn dispose(&mut self, _node: &Rc<Node>) {
        self.source.clear();
    }
}
