//! Graph Nodes
//!
//! A [`Node`] is one mounted element. Nodes form a tree: every node except
//! the root is owned by a child slot of its parent and holds a weak
//! [`ParentLink`] back up.
//!
//! # Update cycle
//!
//! All requests to update a node go through its [`UpdateQueue`]. The node
//! drains the queue in [`Node::run_updates`]; a request arriving while the
//! node is already draining (for example `set_state` called from one of its
//! own hooks) is merged into the queue and picked up by the running drain.
//! A single pass runs:
//!
//! 1. `will_receive_props` (only when new props arrived after mount)
//! 2. state merge and `derive_state`
//! 3. `should_update` (skipped on mount); a `false` commits props and state
//!    but stops here
//! 4. render, reconciling children
//! 5. commit of the value, queued for publication
//! 6. `did_mount` or `did_update`
//!
//! A node that settled on a new value tells its parent once, after its drain
//! finishes. Parents ignore these notices while they are rendering, since
//! they read their children's values right after.
//!
//! # Failure
//!
//! A failed node disposes itself and hands the error to its parent through
//! the link. A failed root returns the error to whoever triggered the work
//! and publishes it to its subscribers.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::behavior::{Behavior, Output, Snapshot};
use super::scheduler::{UpdateQueue, Work};
use super::slot::Slot;
use super::transaction::{Notice, Transaction};
use crate::builtins;
use crate::element::{Element, Kind, Props};
use crate::error::{Error, Result};
use crate::reactive::{Subscriber, Subscription};
use crate::value::Value;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle phase of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mounting; no value committed yet.
    Constructing,
    /// Idle with a committed value.
    Mounted,
    /// Draining queued updates.
    Updating,
    /// Terminal.
    Disposed,
}

/// Weak reference from a child to the slot that owns it.
pub(crate) struct ParentLink {
    node: Weak<Node>,
    slot: Slot,
}

impl ParentLink {
    pub fn new(node: &Rc<Node>, slot: Slot) -> Self {
        Self {
            node: Rc::downgrade(node),
            slot,
        }
    }

    fn resolve(&self) -> Option<(Rc<Node>, Slot)> {
        self.node.upgrade().map(|node| (node, self.slot.clone()))
    }
}

struct Core {
    props: Props,
    state: Value,
    value: Value,
}

pub(crate) struct Node {
    id: NodeId,
    name: String,
    kind: Kind,
    phase: Cell<Phase>,
    core: RefCell<Core>,
    behavior: RefCell<Box<dyn Behavior>>,
    queue: RefCell<UpdateQueue>,
    /// A drain is running.
    updating: Cell<bool>,
    /// Inside render or refresh; child change notices are redundant.
    reconciling: Cell<bool>,
    /// A value was committed during the current drain.
    changed: Cell<bool>,
    /// Disposed mid-drain; tear down once the drain unwinds.
    teardown_deferred: Cell<bool>,
    parent: RefCell<Option<ParentLink>>,
    subscribers: RefCell<SmallVec<[Rc<Subscriber>; 2]>>,
    tx: Rc<Transaction>,
}

impl Node {
    /// Construct a node for `element` and run its first update pass.
    ///
    /// For a child (`parent` present) a failure during mount is routed to
    /// the parent and the returned node is already disposed. For a root the
    /// failure is returned.
    pub fn mount(
        element: Element,
        parent: Option<ParentLink>,
        tx: Rc<Transaction>,
    ) -> Result<Rc<Node>> {
        let kind = element.kind().clone();
        let is_root = parent.is_none();
        let node = Rc::new(Node {
            id: NodeId::new(),
            name: kind.name().to_string(),
            behavior: RefCell::new(builtins::create(&kind)),
            kind,
            phase: Cell::new(Phase::Constructing),
            core: RefCell::new(Core {
                props: element.props().clone(),
                state: Value::Null,
                value: Value::Null,
            }),
            queue: RefCell::new(UpdateQueue::default()),
            updating: Cell::new(false),
            reconciling: Cell::new(false),
            changed: Cell::new(false),
            teardown_deferred: Cell::new(false),
            parent: RefCell::new(parent),
            subscribers: RefCell::new(SmallVec::new()),
            tx,
        });
        if is_root {
            node.tx.attach_root(&node);
        }
        debug!(node = %node.name, id = node.id.raw(), key = ?element.key(), "mount");

        node.queue.borrow_mut().push_mount();
        node.run_updates()?;
        Ok(node)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.phase.get() == Phase::Disposed
    }

    pub fn transaction(&self) -> &Rc<Transaction> {
        &self.tx
    }

    pub fn props(&self) -> Props {
        self.core.borrow().props.clone()
    }

    pub fn state(&self) -> Value {
        self.core.borrow().state.clone()
    }

    pub fn value(&self) -> Value {
        self.core.borrow().value.clone()
    }

    pub fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.is_disposed() {
            Err(Error::disposed(self.name.as_str(), operation))
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    pub fn receive_props(self: &Rc<Self>, props: Props) -> Result<()> {
        self.ensure_live("set props on")?;
        if !props.fits(&self.kind) {
            return Err(Error::configuration(format!(
                "`{}` node cannot take props {props:?}",
                self.name
            )));
        }
        let props = match (&self.kind, props) {
            (Kind::Component(def), Props::Value(value)) => Props::Value(def.resolve_props(value)?),
            (_, props) => props,
        };
        self.queue.borrow_mut().push_props(props);
        self.run_updates()
    }

    pub fn set_state(self: &Rc<Self>, patch: Value) -> Result<()> {
        self.ensure_live("set state on")?;
        self.queue.borrow_mut().push_state(patch);
        self.run_updates()
    }

    pub fn child_changed(self: &Rc<Self>, slot: Slot) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        self.queue.borrow_mut().push_changed(slot);
        self.run_updates()
    }

    pub fn child_failed(self: &Rc<Self>, slot: Slot, error: Error) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        self.queue.borrow_mut().push_failure(slot, error);
        self.run_updates()
    }

    pub fn dispose(self: &Rc<Self>) -> Result<()> {
        self.ensure_live("dispose")?;
        self.phase.set(Phase::Disposed);
        self.tx.enqueue(self, Notice::Completed);
        if self.updating.get() {
            self.teardown_deferred.set(true);
        } else {
            self.teardown();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drain
    // ------------------------------------------------------------------

    /// Drain the update queue to a fixed point. Returns immediately if a
    /// drain is already running further up the stack.
    pub fn run_updates(self: &Rc<Self>) -> Result<()> {
        if self.updating.get() || self.is_disposed() || self.queue.borrow().is_empty() {
            return Ok(());
        }
        self.updating.set(true);
        let _tx = self.tx.begin();

        let limit = self.tx.options().max_update_passes;
        let mut passes = 0usize;
        let result = loop {
            if self.is_disposed() {
                break Ok(());
            }
            let Some(work) = self.queue.borrow_mut().take() else {
                break Ok(());
            };
            passes += 1;
            if passes > limit {
                break Err(Error::lifecycle(format!(
                    "`{}` did not settle after {limit} update passes",
                    self.name
                )));
            }
            if self.phase.get() == Phase::Mounted {
                self.phase.set(Phase::Updating);
            }
            if let Err(error) = self.cycle(work) {
                break Err(error);
            }
        };

        self.updating.set(false);
        if self.phase.get() == Phase::Updating {
            self.phase.set(Phase::Mounted);
        }
        if self.teardown_deferred.take() {
            self.teardown();
        }

        match result {
            Err(error) => self.fail(error),
            Ok(()) if self.changed.take() && !self.is_disposed() => self.notify_parent(),
            Ok(()) => Ok(()),
        }
    }

    fn cycle(self: &Rc<Self>, work: Work) -> Result<()> {
        let mut changed = work.changed;
        for (slot, error) in work.failures {
            self.behavior.borrow_mut().child_failed(self, &slot, error)?;
            changed.insert(slot);
        }
        if self.is_disposed() {
            return Ok(());
        }

        if work.mount || work.props.is_some() || work.state.is_some() {
            self.update(work.mount, work.props, work.state)
        } else if !changed.is_empty() {
            self.refresh(&changed)
        } else {
            Ok(())
        }
    }

    fn update(self: &Rc<Self>, mount: bool, props: Option<Props>, state: Option<Value>) -> Result<()> {
        if let (false, Some(next)) = (mount, props.as_ref()) {
            self.behavior.borrow_mut().will_receive_props(self, next)?;
            if self.is_disposed() {
                return Ok(());
            }
        }
        // State set from will_receive_props joins this pass.
        let patch = match (state, self.queue.borrow_mut().take_state()) {
            (Some(first), Some(late)) => Some(first.merge(&late)),
            (first, late) => first.or(late),
        };

        let previous = self.snapshot();
        let next_props = props.unwrap_or_else(|| previous.props.clone());
        let base = if mount {
            self.behavior.borrow_mut().initial_state(&next_props)
        } else {
            previous.state.clone()
        };
        let mut next_state = match &patch {
            Some(patch) => base.merge(patch),
            None => base,
        };
        let derived = self.behavior.borrow().derive_state(&next_props, &next_state);
        if let Some(derived) = derived {
            next_state = next_state.merge(&derived);
        }

        let proceed =
            mount || self.behavior.borrow_mut().should_update(self, &next_props, &next_state);
        {
            let mut core = self.core.borrow_mut();
            core.props = next_props;
            core.state = next_state;
        }
        if !proceed {
            trace!(node = %self.name, id = self.id.raw(), "update skipped");
            return Ok(());
        }
        if self.is_disposed() {
            return Ok(());
        }

        self.queue.borrow_mut().clear_changed();
        let output = self.reconciling(|| self.behavior.borrow_mut().render(self))?;
        if self.is_disposed() {
            return Ok(());
        }
        let output = self.settle_failures(output)?;
        self.commit(output);

        if mount {
            self.phase.set(Phase::Mounted);
            self.behavior.borrow_mut().did_mount(self)
        } else {
            self.behavior.borrow_mut().did_update(self, &previous)
        }
    }

    fn refresh(self: &Rc<Self>, changed: &IndexSet<Slot>) -> Result<()> {
        let previous = self.snapshot();
        let output = self.reconciling(|| self.behavior.borrow_mut().refresh(self, changed))?;
        if self.is_disposed() {
            return Ok(());
        }
        let output = self.settle_failures(output)?;
        if let Output::Unchanged = output {
            return Ok(());
        }
        self.commit(output);
        self.behavior.borrow_mut().did_update(self, &previous)
    }

    /// Handle children that failed while mounting during the render that
    /// produced `output`; if any did, recompute from the remaining children.
    fn settle_failures(self: &Rc<Self>, output: Output) -> Result<Output> {
        let failures = self.queue.borrow_mut().take_failures();
        if failures.is_empty() {
            return Ok(output);
        }
        let mut changed = IndexSet::new();
        for (slot, error) in failures {
            self.behavior.borrow_mut().child_failed(self, &slot, error)?;
            changed.insert(slot);
        }
        self.reconciling(|| self.behavior.borrow_mut().refresh(self, &changed))
    }

    fn reconciling<T>(&self, f: impl FnOnce() -> T) -> T {
        let outer = self.reconciling.replace(true);
        let result = f();
        self.reconciling.set(outer);
        result
    }

    fn commit(self: &Rc<Self>, output: Output) {
        if let Output::Value(value) = output {
            self.core.borrow_mut().value = value;
            self.changed.set(true);
            self.tx.enqueue(self, Notice::Changed);
        }
    }

    fn snapshot(&self) -> Snapshot {
        let core = self.core.borrow();
        Snapshot {
            props: core.props.clone(),
            state: core.state.clone(),
            value: core.value.clone(),
        }
    }

    fn notify_parent(self: &Rc<Self>) -> Result<()> {
        let link = self.parent.borrow().as_ref().and_then(ParentLink::resolve);
        match link {
            Some((parent, _)) if parent.reconciling.get() => Ok(()),
            Some((parent, slot)) => parent.child_changed(slot),
            None => Ok(()),
        }
    }

    fn fail(self: &Rc<Self>, error: Error) -> Result<()> {
        if self.is_disposed() {
            debug!(node = %self.name, id = self.id.raw(), %error, "error after disposal dropped");
            return Ok(());
        }
        warn!(node = %self.name, id = self.id.raw(), %error, "node failed");

        let link = self.parent.borrow_mut().take();
        self.phase.set(Phase::Disposed);
        self.teardown();
        self.tx.enqueue(self, Notice::Failed(error.clone()));

        match link.as_ref().and_then(ParentLink::resolve) {
            Some((parent, slot)) => parent.child_failed(slot, error),
            None => Err(error),
        }
    }

    fn teardown(self: &Rc<Self>) {
        debug!(node = %self.name, id = self.id.raw(), "dispose");
        self.queue.borrow_mut().clear();
        self.behavior.borrow_mut().dispose(self);
        self.parent.borrow_mut().take();
    }

    // ------------------------------------------------------------------
    // Subscribers
    // ------------------------------------------------------------------

    pub fn subscribe(self: &Rc<Self>, subscriber: Subscriber) -> Result<Subscription> {
        self.ensure_live("subscribe to")?;
        let id = subscriber.id();
        let subscriber = Rc::new(subscriber);
        self.subscribers.borrow_mut().push(subscriber.clone());
        if self.tx.options().emit_initial_value {
            subscriber.emit_value(&self.value());
        }

        let node = Rc::downgrade(self);
        Ok(Subscription::new(id, move || {
            if let Some(node) = node.upgrade() {
                node.subscribers.borrow_mut().retain(|s| s.id() != id);
            }
        }))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn subscribers(&self) -> Vec<Rc<Subscriber>> {
        self.subscribers.borrow().to_vec()
    }

    /// Deliver a queued notice. Terminal notices close the subscribers'
    /// transaction bracket and release them.
    pub fn publish(&self, notice: &Notice) {
        let subscribers = self.subscribers();
        if subscribers.is_empty() {
            return;
        }
        trace!(node = %self.name, id = self.id.raw(), ?notice, subscribers = subscribers.len(), "publish");
        match notice {
            Notice::Changed => {
                let value = self.value();
                for s in &subscribers {
                    s.emit_value(&value);
                }
                return;
            }
            Notice::Completed => {
                for s in &subscribers {
                    s.emit_complete();
                }
            }
            Notice::Failed(error) => {
                for s in &subscribers {
                    s.emit_error(error);
                }
            }
        }
        for s in &subscribers {
            s.transaction_end();
        }
        self.subscribers.borrow_mut().clear();
    }

    pub fn transaction_started(&self) {
        for s in &self.subscribers() {
            s.transaction_start();
        }
    }

    pub fn transaction_ended(&self) {
        for s in &self.subscribers() {
            s.transaction_end();
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phase", &self.phase.get())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn mounting_a_constant_commits_its_value() {
        let tx = Transaction::new(Options::default());
        let node = Node::mount(Element::constant(7), None, tx.clone()).unwrap();

        assert_eq!(node.value(), Value::Int(7));
        assert_eq!(node.phase(), Phase::Mounted);
        assert_eq!(tx.depth(), 0);
    }

    #[test]
    fn dispose_is_terminal() {
        let tx = Transaction::new(Options::default());
        let node = Node::mount(Element::constant(1), None, tx).unwrap();

        node.dispose().unwrap();
        assert!(node.is_disposed());
        assert!(matches!(node.dispose(), Err(Error::Reentrancy { .. })));
        assert!(node.receive_props(Props::Value(Value::Int(2))).is_err());
    }

    #[test]
    fn mismatched_props_are_rejected_without_disposing() {
        let tx = Transaction::new(Options::default());
        let node = Node::mount(Element::constant(1), None, tx).unwrap();

        let err = node
            .receive_props(Props::Combine(Default::default()))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!node.is_disposed());
    }
}
