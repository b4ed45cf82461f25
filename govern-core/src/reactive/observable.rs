//! Observables and subscriptions.
//!
//! Anything outside a governed tree that produces values over time plugs in
//! through [`Observable`]. A [`Store`] is a shared reference to one, compared
//! by the identity of the underlying observable rather than by its value,
//! which is what reconciliation of `subscribe` elements keys on.

use std::fmt;
use std::rc::Rc;

use super::subscriber::{Subscriber, SubscriberId};
use crate::error::Result;
use crate::value::Value;

/// A source of values that can be subscribed to.
pub trait Observable {
    /// Stable identity of the underlying source. Two handles to the same
    /// source must return the same identity.
    fn identity(&self) -> usize;

    /// The current settled value.
    fn get_value(&self) -> Result<Value>;

    /// Register a subscriber. The subscription ends when the returned handle
    /// is dropped or unsubscribed.
    fn subscribe(&self, subscriber: Subscriber) -> Result<Subscription>;
}

/// Handle for one subscription.
///
/// Dropping the handle unsubscribes. Unsubscribing never disposes the
/// observed source.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriberId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(id: SubscriberId, cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// End the subscription now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Shared, identity-compared reference to an [`Observable`].
#[derive(Clone)]
pub struct Store(Rc<dyn Observable>);

impl Store {
    pub fn new<O: Observable + 'static>(observable: O) -> Self {
        Self(Rc::new(observable))
    }

    /// Whether both stores refer to the same underlying source.
    pub fn same(&self, other: &Store) -> bool {
        self.0.identity() == other.0.identity()
    }

    pub fn identity(&self) -> usize {
        self.0.identity()
    }

    pub fn get_value(&self) -> Result<Value> {
        self.0.get_value()
    }

    pub fn subscribe(&self, subscriber: Subscriber) -> Result<Subscription> {
        self.0.subscribe(subscriber)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store({:#x})", self.0.identity())
    }
}
