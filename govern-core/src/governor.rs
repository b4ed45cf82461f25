//! Governor
//!
//! A [`Governor`] owns the root node of one tree and is the only way in from
//! the outside: it reads the settled value, subscribes, updates the root's
//! props, and disposes the tree. It is itself an [`Observable`], so one
//! governed tree can subscribe to another.
//!
//! # Example
//!
//! ```rust
//! use govern_core::{Element, Governor, Signal, Value};
//!
//! let count = Signal::new(1);
//! let doubled = Element::map(count.clone(), |v| Value::Int(v.as_i64().unwrap_or(0) * 2));
//! let governor = Governor::new(doubled).unwrap();
//! assert_eq!(governor.get_value().unwrap(), Value::Int(2));
//!
//! count.set(5);
//! assert_eq!(governor.get_value().unwrap(), Value::Int(10));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::element::{Element, Props, Renderable};
use crate::error::Result;
use crate::graph::transaction::Transaction;
use crate::graph::{Node, Phase};
use crate::options::Options;
use crate::reactive::{Observable, Store, Subscriber, Subscription};
use crate::value::Value;

/// Handle to a governed tree. Clones refer to the same tree.
#[derive(Clone)]
pub struct Governor {
    root: Rc<Node>,
}

impl Governor {
    /// Mount `element` as the root of a new tree with default options.
    pub fn new(element: Element) -> Result<Self> {
        Self::with_options(element, Options::default())
    }

    /// Mount `element` as the root of a new tree.
    ///
    /// Fails if the options are invalid or the initial mount fails; in the
    /// latter case every node mounted so far has been disposed.
    pub fn with_options(element: Element, options: Options) -> Result<Self> {
        options.validate()?;
        tracing::debug!(root = %element.kind().name(), ?options, "govern");
        let root = Node::mount(element, None, Transaction::new(options))?;
        Ok(Self { root })
    }

    /// The root's settled value.
    pub fn get_value(&self) -> Result<Value> {
        self.root.ensure_live("read the value of")?;
        Ok(self.root.value())
    }

    /// Observe the root. Values arrive once per transaction, after it
    /// settles.
    pub fn subscribe(&self, subscriber: Subscriber) -> Result<Subscription> {
        self.root.subscribe(subscriber)
    }

    /// Replace the root's props.
    ///
    /// The payload must fit the root's kind: a map (or null) for a
    /// component, the matching combinator payload otherwise.
    pub fn set_props(&self, props: impl Into<Props>) -> Result<()> {
        self.root.receive_props(props.into())
    }

    /// Dispose the whole tree. Subscribers receive `on_complete`.
    pub fn dispose(&self) -> Result<()> {
        self.root.ensure_live("dispose")?;
        let _tx = self.root.transaction().begin();
        self.root.dispose()
    }

    /// Drain any pending work now. Work normally runs eagerly, so this only
    /// matters after updates were queued from outside a transaction.
    pub fn flush(&self) -> Result<()> {
        self.root.ensure_live("flush")?;
        self.root.run_updates()?;
        self.root.transaction().settle();
        Ok(())
    }

    /// Run `f` inside one transaction: subscribers see a single settled
    /// result for everything `f` triggers.
    pub fn dispatch<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        self.root.ensure_live("dispatch on")?;
        let _tx = self.root.transaction().begin();
        Ok(f())
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_disposed()
    }

    pub fn phase(&self) -> Phase {
        self.root.phase()
    }

    /// Number of live subscriptions on the root.
    pub fn subscriber_count(&self) -> usize {
        self.root.subscriber_count()
    }

    pub fn store(&self) -> Store {
        Store::new(self.clone())
    }
}

impl Observable for Governor {
    fn identity(&self) -> usize {
        Rc::as_ptr(&self.root) as *const () as usize
    }

    fn get_value(&self) -> Result<Value> {
        Governor::get_value(self)
    }

    fn subscribe(&self, subscriber: Subscriber) -> Result<Subscription> {
        Governor::subscribe(self, subscriber)
    }
}

impl From<Governor> for Store {
    fn from(governor: Governor) -> Self {
        Store::new(governor)
    }
}

impl From<Governor> for Renderable {
    fn from(governor: Governor) -> Self {
        Renderable::Store(governor.into())
    }
}

impl fmt::Debug for Governor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Governor")
            .field("root", &self.root.name())
            .field("phase", &self.root.phase())
            .field("value", &self.root.value())
            .finish()
    }
}
