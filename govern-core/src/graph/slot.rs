//! Child slots.
//!
//! A [`ChildSlot`] holds at most one live child node together with the
//! element it was last reconciled against. Reconciling a new element either
//! updates the child in place or disposes it and mounts a replacement, in
//! that order.

use std::rc::Rc;

use super::node::{Node, ParentLink};
use crate::element::{reconcile, Decision, Element};
use crate::error::Result;
use crate::value::Value;

/// Address of a child slot within its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    /// The node's primary child (a component's rendered child, a
    /// `flat_map`'s inner source, a `subscribe` node's external source).
    Main,
    /// The upstream child of `map`, `flat_map` and `distinct`.
    Source,
    /// A named `combine` entry.
    Entry(String),
}

pub(crate) struct ChildSlot {
    slot: Slot,
    element: Option<Element>,
    node: Option<Rc<Node>>,
}

impl ChildSlot {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            element: None,
            node: None,
        }
    }

    /// Bring the slot in line with `element`.
    pub fn reconcile(&mut self, owner: &Rc<Node>, element: Element) -> Result<()> {
        let live = self.live_node();
        let previous = live.as_ref().and(self.element.as_ref());
        match (reconcile(previous, &element), live) {
            (Decision::Reuse, Some(node)) => {
                tracing::debug!(owner = %owner.name(), slot = ?self.slot, "reuse child");
                let props = element.props().clone();
                self.element = Some(element);
                return node.receive_props(props);
            }
            (Decision::Replace, Some(node)) => tracing::debug!(
                owner = %owner.name(),
                slot = ?self.slot,
                from = %node.name(),
                to = %element.kind().name(),
                "replace child"
            ),
            _ => {}
        }

        self.clear();
        let link = ParentLink::new(owner, self.slot.clone());
        let node = Node::mount(element.clone(), Some(link), owner.transaction().clone())?;
        self.element = Some(element);
        self.node = Some(node);
        Ok(())
    }

    /// The child's settled value, or null if the slot is empty or its child
    /// has failed.
    pub fn value(&self) -> Value {
        self.live_node().map(|n| n.value()).unwrap_or_default()
    }

    /// Dispose the child (if still live) and empty the slot.
    pub fn clear(&mut self) {
        self.element = None;
        if let Some(node) = self.node.take() {
            if !node.is_disposed() {
                if let Err(error) = node.dispose() {
                    tracing::warn!(%error, "child disposal failed");
                }
            }
        }
    }

    fn live_node(&self) -> Option<Rc<Node>> {
        self.node.as_ref().filter(|n| !n.is_disposed()).cloned()
    }
}

impl Drop for ChildSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
