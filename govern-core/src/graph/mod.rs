//! Node Graph
//!
//! The runtime side of the engine: mounted nodes, their update queues, the
//! child slots that own them, and the per-tree transaction that batches
//! publication.
//!
//! # Overview
//!
//! Mounted nodes form a tree rooted at a governor:
//!
//! - Parents own their children through [`ChildSlot`](slot::ChildSlot)s
//! - Children hold weak links back to the owning slot
//! - Values flow upward: a child that settles on a new value prompts its
//!   parent to refresh
//! - Props flow downward: a parent's render reconciles new elements into
//!   its slots
//!
//! # Design Decisions
//!
//! 1. Nodes are single-threaded (`Rc`, `RefCell`). A tree and every store
//!    it subscribes to live on one thread.
//!
//! 2. No borrow is held across a user callback other than the node's own
//!    behavior, and calls re-entering a busy node only touch its queue.
//!
//! 3. Publication is decoupled from computation: nodes queue notices on the
//!    tree's transaction, which publishes once when the outermost unit of
//!    work completes.

pub(crate) mod behavior;
mod node;
mod scheduler;
pub(crate) mod slot;
pub(crate) mod transaction;

pub use node::{NodeId, Phase};
pub(crate) use node::Node;
