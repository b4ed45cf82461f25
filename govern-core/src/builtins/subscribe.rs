use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::element::Props;
use crate::error::Result;
use crate::graph::behavior::{mismatch, Behavior, Output};
use crate::graph::slot::Slot;
use crate::graph::transaction::Transaction;
use crate::graph::Node;
use crate::reactive::{Store, Subscriber, Subscription};

/// Follows an external store.
///
/// The store's transaction brackets are mirrored onto this node's tree, so
/// everything the tree does in response to one upstream transaction is
/// published when that transaction ends.
///
/// A completed store leaves its last value in place; the node stays mounted
/// and ignores the store from then on.
#[derive(Default)]
pub(crate) struct SubscribeNode {
    source: Option<Store>,
    subscription: Option<Subscription>,
    /// An upstream bracket is open and holds our transaction.
    bracket: Rc<Cell<bool>>,
    completed: Rc<Cell<bool>>,
}

impl SubscribeNode {
    /// Follow `store`, releasing whatever store was followed before.
    fn attach(&mut self, node: &Rc<Node>, store: &Store) -> Result<()> {
        if self.source.is_some() {
            tracing::debug!(node = %node.name(), from = ?self.source, to = ?store, "switch store");
        }
        self.release(node);
        self.completed = Rc::new(Cell::new(false));
        self.subscription = Some(store.subscribe(self.subscriber(node))?);
        self.source = Some(store.clone());
        Ok(())
    }

    fn release(&mut self, node: &Rc<Node>) {
        self.source = None;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        close(&self.bracket, node.transaction());
    }

    fn subscriber(&self, node: &Rc<Node>) -> Subscriber {
        let on_value = Rc::downgrade(node);
        let on_error = Rc::downgrade(node);
        let tx = node.transaction().clone();
        let (start_tx, end_tx) = (tx.clone(), tx);
        let (started, ended) = (self.bracket.clone(), self.bracket.clone());
        let completed = self.completed.clone();

        Subscriber::new(move |_| {
            if let Some(node) = on_value.upgrade() {
                if let Err(error) = node.child_changed(Slot::Main) {
                    tracing::debug!(%error, "store update failed its tree");
                }
            }
        })
        .on_error(move |error| {
            if let Some(node) = on_error.upgrade() {
                if let Err(error) = node.child_failed(Slot::Main, error.clone()) {
                    tracing::debug!(%error, "store failure failed its tree");
                }
            }
        })
        .on_complete(move || completed.set(true))
        .on_transaction_start(move || open(&started, &start_tx))
        .on_transaction_end(move || close(&ended, &end_tx))
    }
}

fn open(bracket: &Cell<bool>, tx: &Transaction) {
    if !bracket.replace(true) {
        tx.increase();
    }
}

fn close(bracket: &Cell<bool>, tx: &Transaction) {
    if bracket.replace(false) {
        tx.decrease();
    }
}

impl Behavior for SubscribeNode {
    fn render(&mut self, node: &Rc<Node>) -> Result<Output> {
        let Props::Subscribe(store) = node.props() else {
            return Err(mismatch(node));
        };
        let followed = self.source.as_ref().is_some_and(|source| source.same(&store));
        if !followed {
            self.attach(node, &store)?;
            return Ok(Output::Value(store.get_value()?));
        }
        if self.completed.get() {
            // The store has released us already.
            self.subscription = None;
            return Ok(Output::Unchanged);
        }
        Ok(read(&store))
    }

    fn refresh(&mut self, _node: &Rc<Node>, _changed: &IndexSet<Slot>) -> Result<Output> {
        match &self.source {
            Some(store) if !self.completed.get() => Ok(read(store)),
            _ => Ok(Output::Unchanged),
        }
    }

    fn dispose(&mut self, node: &Rc<Node>) {
        self.release(node);
    }
}

/// A completed store keeps its last value.
fn read(store: &Store) -> Output {
    match store.get_value() {
        Ok(value) => Output::Value(value),
        Err(error) => {
            tracing::trace!(%error, "store no longer readable");
            Output::Unchanged
        }
    }
}
