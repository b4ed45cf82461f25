use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::{ChildSlot, Slot};
use crate::graph::Node;
use crate::value::{Map, Value};

/// One child per key; the value is a map of the children's values.
#[derive(Default)]
pub(crate) struct CombineNode {
    entries: IndexMap<String, ChildSlot>,
}

impl CombineNode {
    fn collect(&self) -> Value {
        let values: Map = self
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.value()))
            .collect();
        Value::from(values)
    }
}

impl Behavior for CombineNode {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::Combine(children) = node.props() else {
            return Err(mismatch(node));
        };

        // Keys that went away are disposed before anything new mounts.
        let removed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| !children.contains_key(*key))
            .cloned()
            .collect();
        for key in removed {
            if let Some(mut slot) = self.entries.shift_remove(&key) {
                slot.clear();
            }
        }

        let mut entries = IndexMap::with_capacity(children.len());
        for (key, child) in children {
            let mut slot = self
                .entries
                .shift_remove(&key)
                .unwrap_or_else(|| ChildSlot::new(Slot::Entry(key.clone())));
            slot.reconcile(node, child.into_element())?;
            entries.insert(key, slot);
        }
        self.entries = entries;

        Ok(Output::Value(self.collect()))
    }

    fn refresh(&mut self, _node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        Ok(Output::Value(self.collect()))
    }

    fn dispose(&mut self, _node: &Rc<Node>) {
        for (_, mut slot) in self.entries.drain(..) {
            slot.clear();
        }
    }
}
