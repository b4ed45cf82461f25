//! Signal Implementation
//!
//! A Signal is a settable value living outside any governed tree. It is the
//! simplest [`Observable`]: trees consume it through `subscribe` elements.
//!
//! # Transactions
//!
//! Every `set` is bracketed: subscribers see `on_transaction_start`, then the
//! new value, then `on_transaction_end`. A tree subscribed to the signal keeps
//! its own transaction open across the bracket, so all of the tree's
//! reactions to one `set` are published together.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::observable::{Observable, Store, Subscription};
use super::subscriber::Subscriber;
use crate::error::Result;
use crate::value::Value;

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique signal ID.
fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct Inner {
    id: u64,
    value: RefCell<Value>,
    subscribers: RefCell<SmallVec<[Rc<Subscriber>; 2]>>,
}

/// A settable external value.
///
/// Clones share state.
///
/// # Example
///
/// ```rust
/// use govern_core::{Signal, Value};
///
/// let count = Signal::new(0);
/// count.set(5);
/// assert_eq!(count.get(), Value::Int(5));
/// ```
#[derive(Clone)]
pub struct Signal {
    inner: Rc<Inner>,
}

impl Signal {
    /// Create a new signal with the given initial value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: next_signal_id(),
                value: RefCell::new(value.into()),
                subscribers: RefCell::new(SmallVec::new()),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get the current value.
    pub fn get(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Set a new value and notify subscribers inside one transaction bracket.
    pub fn set(&self, value: impl Into<Value>) {
        let subscribers: Vec<Rc<Subscriber>> = self.inner.subscribers.borrow().to_vec();

        for s in &subscribers {
            s.transaction_start();
        }

        let value = value.into();
        *self.inner.value.borrow_mut() = value.clone();
        tracing::trace!(signal = self.inner.id, subscribers = subscribers.len(), "signal set");

        for s in &subscribers {
            s.emit_value(&value);
        }
        for s in &subscribers {
            s.transaction_end();
        }
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// A [`Store`] referring to this signal.
    pub fn store(&self) -> Store {
        Store::new(self.clone())
    }
}

impl Observable for Signal {
    fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    fn get_value(&self) -> Result<Value> {
        Ok(self.get())
    }

    fn subscribe(&self, subscriber: Subscriber) -> Result<Subscription> {
        let id = subscriber.id();
        self.inner.subscribers.borrow_mut().push(Rc::new(subscriber));

        let inner = Rc::downgrade(&self.inner);
        Ok(Subscription::new(id, move || {
            if let Some(inner) = inner.upgrade() {
                inner.subscribers.borrow_mut().retain(|s| s.id() != id);
            }
        }))
    }
}

impl From<Signal> for Store {
    fn from(signal: Signal) -> Self {
        Store::new(signal)
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
