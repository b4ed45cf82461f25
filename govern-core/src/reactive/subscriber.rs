//! Subscriber types for the reactive system.
//!
//! A Subscriber is the set of callbacks an observer registers with an
//! [`Observable`](super::Observable). Besides values it receives the
//! observable's terminal events (error, completion) and the brackets of every
//! transaction the observable runs, which lets a downstream tree hold its own
//! transaction open for exactly as long as an upstream one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Error;
use crate::value::Value;

/// Unique identifier for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

type Callback = Box<dyn Fn()>;

/// Callbacks observing one observable.
///
/// Only `on_value` is required; the builder methods attach the rest.
pub struct Subscriber {
    id: SubscriberId,
    on_value: Box<dyn Fn(&Value)>,
    on_error: Option<Box<dyn Fn(&Error)>>,
    on_complete: Option<Callback>,
    on_transaction_start: Option<Callback>,
    on_transaction_end: Option<Callback>,
}

impl Subscriber {
    /// Create a subscriber with the given value callback.
    pub fn new<F>(on_value: F) -> Self
    where
        F: Fn(&Value) + 'static,
    {
        Self {
            id: SubscriberId::new(),
            on_value: Box::new(on_value),
            on_error: None,
            on_complete: None,
            on_transaction_start: None,
            on_transaction_end: None,
        }
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_transaction_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_transaction_start = Some(Box::new(f));
        self
    }

    pub fn on_transaction_end<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_transaction_end = Some(Box::new(f));
        self
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn emit_value(&self, value: &Value) {
        (self.on_value)(value);
    }

    pub(crate) fn emit_error(&self, error: &Error) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }

    pub(crate) fn emit_complete(&self) {
        if let Some(f) = &self.on_complete {
            f();
        }
    }

    pub(crate) fn transaction_start(&self) {
        if let Some(f) = &self.on_transaction_start {
            f();
        }
    }

    pub(crate) fn transaction_end(&self) {
        if let Some(f) = &self.on_transaction_end {
            f();
        }
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
