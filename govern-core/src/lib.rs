//! Govern Core
//!
//! This crate provides a component-oriented reconciliation engine for
//! reactive state stores. It implements:
//!
//! - Elements: immutable descriptions of the nodes a tree should hold
//! - Built-in combinators (`constant`, `map`, `flat_map`, `combine`,
//!   `distinct`, `subscribe`) and user components with lifecycle hooks
//! - Keyed reconciliation that reuses or replaces nodes between renders
//! - Transactions that batch every reaction to one change into a single
//!   published value
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `value`: The dynamically typed values flowing through a tree
//! - `element`: Element descriptions and the reuse rule
//! - `component`: User component definitions and instance handles
//! - `graph`: Mounted nodes, update queues and transactions
//! - `reactive`: Observables, subscribers and the `Signal` store
//! - `governor`: The public handle on a mounted tree
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use govern_core::{Component, Element, Governor, Renderable, Value};
//!
//! // A counter exposing its count and an action to increase it.
//! let counter = Rc::new(
//!     Component::new("Counter", |cx| {
//!         let count = cx.state()["count"].as_i64().unwrap_or(0);
//!         let increase = cx.action(move |cx| cx.set_state(Value::map([("count", count + 1)])));
//!         Ok(Renderable::from(Value::map([
//!             ("count", Value::Int(count)),
//!             ("increase", increase),
//!         ])))
//!     })
//!     .initial_state(|_| Value::map([("count", 0)])),
//! );
//!
//! let governor = Governor::new(Element::component(&counter, Value::Null).unwrap()).unwrap();
//! governor.get_value().unwrap()["increase"].call().unwrap();
//! assert_eq!(governor.get_value().unwrap()["count"], Value::Int(1));
//! ```

mod builtins;
pub mod component;
pub mod element;
pub mod error;
pub mod governor;
pub mod graph;
pub mod options;
pub mod reactive;
pub mod value;

pub use component::{Component, Instance, Previous};
pub use element::{Element, Key, Kind, Props, Renderable};
pub use error::{Error, Result};
pub use governor::Governor;
pub use graph::{NodeId, Phase};
pub use options::Options;
pub use reactive::{Observable, Signal, Store, Subscriber, SubscriberId, Subscription};
pub use value::{Action, Map, Value};
