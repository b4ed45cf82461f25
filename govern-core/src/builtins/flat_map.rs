use std::rc::Rc;

use indexmap::IndexSet;

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::{ChildSlot, Slot};
use crate::graph::Node;

/// Mounts `to(from)` as an inner child and follows its value. A new `from`
/// value reconciles the inner slot, so an inner element that stays the same
/// kind (or the same store) keeps its node.
pub(crate) struct FlatMapNode {
    source: ChildSlot,
    inner: ChildSlot,
}

impl FlatMapNode {
    pub fn new() -> Self {
        Self {
            source: ChildSlot::new(Slot::Source),
            inner: ChildSlot::new(Slot::Main),
        }
    }

    fn switch(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::FlatMap { to, .. } = node.props() else {
            return Err(mismatch(node));
        };
        let next = to(&self.source.value()).into_element();
        self.inner.reconcile(node, next)?;
        Ok(Output::Value(self.inner.value()))
    }
}

impl Behavior for FlatMapNode {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::FlatMap { from, .. } = node.props() else {
            return Err(mismatch(node));
        };
        self.source.reconcile(node, (*from).into_element())?;
        self.switch(node)
    }

    fn refresh(&mut self, node: &Rc<Node>, changed: &IndexSet<Slot>) -> Result<Output> {
        if changed.contains(&Slot::Source) {
            self.switch(node)
        } else {
            Ok(Output::Value(self.inner.value()))
        }
    }

    fn dispose(&mut self, _node: &Rc<Node>) {
        self.inner.clear();
        self.source.clear();
    }
}
