//! Reactive Primitives
//!
//! This module implements the boundary between governed trees and the
//! outside world: observables, their subscribers, and a minimal settable
//! store.
//!
//! # Concepts
//!
//! ## Observables
//!
//! An [`Observable`] produces values over time. Governed trees consume them
//! through `subscribe` elements, and every [`Governor`](crate::Governor) is
//! one, so trees compose.
//!
//! ## Subscribers
//!
//! A [`Subscriber`] bundles the callbacks an observer registers: values,
//! errors, completion, and the start and end of each upstream transaction.
//!
//! ## Signals
//!
//! A [`Signal`] is a settable value with subscribers, the simplest store to
//! feed into a tree.

mod observable;
mod signal;
mod subscriber;

pub use observable::{Observable, Store, Subscription};
pub use signal::Signal;
pub use subscriber::{Subscriber, SubscriberId};
