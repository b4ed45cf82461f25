//! Transactions
//!
//! Every governed tree has one [`Transaction`] coordinator. Any engine work
//! (mounting, receiving props, setting state, reacting to a child or to an
//! external store) runs inside a transaction; nested work only deepens it.
//!
//! # Publication
//!
//! Nodes do not notify their subscribers directly. A commit, a disposal or a
//! failure enqueues a [`Notice`] for the node; when the outermost transaction
//! closes, the queue is flushed and every queued node publishes once, with
//! its settled value.
//!
//! The root's subscribers additionally observe the transaction itself:
//! `on_transaction_start` when depth leaves zero, `on_transaction_end` after
//! the flush.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::node::{Node, NodeId};
use crate::error::Error;
use crate::options::Options;

/// What a node publishes when the transaction closes.
#[derive(Debug, Clone)]
pub(crate) enum Notice {
    Changed,
    Completed,
    Failed(Error),
}

impl Notice {
    /// Terminal notices supersede value notices; a failure supersedes a
    /// completion.
    fn rank(&self) -> u8 {
        match self {
            Notice::Changed => 0,
            Notice::Completed => 1,
            Notice::Failed(_) => 2,
        }
    }
}

pub(crate) struct Transaction {
    depth: Cell<usize>,
    queue: RefCell<IndexMap<NodeId, (Weak<Node>, Notice)>>,
    root: RefCell<Weak<Node>>,
    options: Options,
}

impl Transaction {
    pub fn new(options: Options) -> Rc<Self> {
        Rc::new(Self {
            depth: Cell::new(0),
            queue: RefCell::new(IndexMap::new()),
            root: RefCell::new(Weak::new()),
            options,
        })
    }

    pub fn attach_root(&self, root: &Rc<Node>) {
        *self.root.borrow_mut() = Rc::downgrade(root);
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Open a transaction; it closes when the guard drops.
    pub fn begin(self: &Rc<Self>) -> TransactionGuard {
        self.increase();
        TransactionGuard { tx: self.clone() }
    }

    pub fn increase(&self) {
        let depth = self.depth.get();
        self.depth.set(depth + 1);
        tracing::trace!(depth = depth + 1, "transaction increase");
        if depth == 0 {
            if let Some(root) = self.root() {
                root.transaction_started();
            }
        }
    }

    pub fn decrease(&self) {
        let depth = self.depth.get();
        if depth == 0 {
            tracing::warn!("transaction closed more often than opened");
            return;
        }
        self.depth.set(depth - 1);
        tracing::trace!(depth = depth - 1, "transaction decrease");
        if depth == 1 {
            self.flush();
        }
    }

    /// Queue `notice` for `node`. A node queued again moves to the back with
    /// the stronger of the two notices.
    pub fn enqueue(&self, node: &Rc<Node>, notice: Notice) {
        let mut queue = self.queue.borrow_mut();
        let notice = match queue.shift_remove(&node.id()) {
            Some((_, queued)) if queued.rank() > notice.rank() => queued,
            _ => notice,
        };
        queue.insert(node.id(), (Rc::downgrade(node), notice));
    }

    /// Publish anything left queued outside a transaction.
    pub fn settle(&self) {
        if self.depth.get() == 0 && !self.queue.borrow().is_empty() {
            self.increase();
            self.decrease();
        }
    }

    fn flush(&self) {
        loop {
            let batch = std::mem::take(&mut *self.queue.borrow_mut());
            if batch.is_empty() {
                break;
            }
            tracing::trace!(nodes = batch.len(), "transaction flush");
            for (_, (node, notice)) in batch {
                if let Some(node) = node.upgrade() {
                    node.publish(&notice);
                }
            }
        }
        if let Some(root) = self.root() {
            root.transaction_ended();
        }
    }

    fn root(&self) -> Option<Rc<Node>> {
        self.root.borrow().upgrade()
    }
}

#[must_use]
pub(crate) struct TransactionGuard {
    tx: Rc<Transaction>,
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        self.tx.decrease();
    }
}
