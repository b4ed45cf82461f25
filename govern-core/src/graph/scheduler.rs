//! Update Scheduler
//!
//! Every node owns an [`UpdateQueue`]. Anything that wants a node to update
//! (new props, a state patch, a child that settled on a new value, a child
//! that failed) pushes onto the queue; the node's engine drains it to a fixed
//! point.
//!
//! # Merging
//!
//! Pending work is merged rather than appended:
//!
//! 1. Props: the latest props win.
//! 2. State: patches are shallow-merged in arrival order.
//! 3. Changed slots: a set, so a child that changes twice is refreshed once.
//! 4. Failures: kept in arrival order; each is handled exactly once.
//!
//! A drained [`Work`] item is therefore one update pass, however many
//! requests produced it.

use indexmap::IndexSet;
use smallvec::SmallVec;

use super::slot::Slot;
use crate::element::Props;
use crate::error::Error;
use crate::value::Value;

/// One merged update pass.
#[derive(Default)]
pub(crate) struct Work {
    /// First pass of a freshly constructed node.
    pub mount: bool,
    pub props: Option<Props>,
    pub state: Option<Value>,
    pub changed: IndexSet<Slot>,
    pub failures: SmallVec<[(Slot, Error); 1]>,
}

impl Work {
    pub fn is_empty(&self) -> bool {
        !self.mount
            && self.props.is_none()
            && self.state.is_none()
            && self.changed.is_empty()
            && self.failures.is_empty()
    }
}

/// Pending work for one node.
#[derive(Default)]
pub(crate) struct UpdateQueue {
    pending: Work,
}

impl UpdateQueue {
    pub fn push_mount(&mut self) {
        self.pending.mount = true;
    }

    pub fn push_props(&mut self, props: Props) {
        self.pending.props = Some(props);
    }

    pub fn push_state(&mut self, patch: Value) {
        self.pending.state = Some(match self.pending.state.take() {
            Some(existing) => existing.merge(&patch),
            None => patch,
        });
    }

    pub fn push_changed(&mut self, slot: Slot) {
        self.pending.changed.insert(slot);
    }

    pub fn push_failure(&mut self, slot: Slot, error: Error) {
        self.pending.failures.push((slot, error));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take everything pending as one pass.
    pub fn take(&mut self) -> Option<Work> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Take only the pending state patch (state set while props were being
    /// received joins the pass already in progress).
    pub fn take_state(&mut self) -> Option<Value> {
        self.pending.state.take()
    }

    pub fn take_failures(&mut self) -> SmallVec<[(Slot, Error); 1]> {
        std::mem::take(&mut self.pending.failures)
    }

    /// Forget child changes: a render is about to read every child afresh.
    pub fn clear_changed(&mut self) {
        self.pending.changed.clear();
    }

    pub fn clear(&mut self) {
        self.pending = Work::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_queue_yields_nothing() {
        let mut queue = UpdateQueue::default();
        assert!(queue.take().is_none());
    }

    #[test]
    fn state_patches_merge_in_order() {
        let mut queue = UpdateQueue::default();
        queue.push_state(Value::from(json!({ "a": 1, "b": 1 })));
        queue.push_state(Value::from(json!({ "b": 2 })));

        let work = queue.take().unwrap();
        assert_eq!(work.state, Some(Value::from(json!({ "a": 1, "b": 2 }))));
        assert!(queue.take().is_none());
    }

    #[test]
    fn latest_props_win() {
        let mut queue = UpdateQueue::default();
        queue.push_props(Props::Value(Value::Int(1)));
        queue.push_props(Props::Value(Value::Int(2)));

        let work = queue.take().unwrap();
        assert_eq!(work.props.and_then(|p| p.as_value().cloned()), Some(Value::Int(2)));
    }

    #[test]
    fn repeated_changes_collapse() {
        let mut queue = UpdateQueue::default();
        queue.push_changed(Slot::Main);
        queue.push_changed(Slot::Main);
        queue.push_changed(Slot::Entry("a".into()));

        assert_eq!(queue.take().unwrap().changed.len(), 2);
    }

    #[test]
    fn clear_changed_keeps_other_work() {
        let mut queue = UpdateQueue::default();
        queue.push_changed(Slot::Source);
        queue.push_state(Value::from(json!({ "x": 1 })));
        queue.clear_changed();

        let work = queue.take().unwrap();
        assert!(work.changed.is_empty());
        assert!(work.state.is_some());
    }
}
